//! File and environment configuration
//!
//! Values resolve in this order (highest priority wins):
//!
//! 1. Environment variables (`ROWMAP_TABLE_NAME`, `ROWMAP_LOG_ENABLED`,
//!    `ROWMAP_LOG_LEVEL`)
//! 2. Config file (`rowmap.toml`)
//! 3. Defaults
//!
//! ```toml
//! [table]
//! name = "SingersV2"
//!
//! [logging]
//! enabled = true
//! level = "debug"
//! ```

pub mod logging;
pub mod table;

pub use logging::LoggingConfig;
pub use table::TableConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::LogCrateLogger;
use crate::options::Options;

/// Complete Rowmap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowmapConfig {
    pub table: TableConfig,
    pub logging: LoggingConfig,
}

impl RowmapConfig {
    /// Load `rowmap.toml` from the working directory, if present, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from("rowmap.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.table.merge(other.table);
        self.logging.merge(other.logging);
    }

    pub fn apply_env_vars(&mut self) {
        self.table.apply_env_vars();
        self.logging.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Builder options with a `log`-facade logger at the configured level
    pub fn into_options(self) -> Result<Options> {
        self.validate()?;
        let logger = LogCrateLogger::new(self.logging.log_level()?);
        let mut options = Options::new().with_logger(logger).with_log_enabled(self.logging.enabled);
        if let Some(name) = self.table.name {
            options = options.with_table_name(name);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RowmapConfig::default();
        assert_eq!(config.table.name, None);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = RowmapConfig::from_toml_str("[logging]\nenabled = true\n").unwrap();
        assert!(config.logging.enabled);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.table, TableConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = RowmapConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());
        assert!(config.into_options().is_err());

        let config = RowmapConfig::from_toml_str("[table]\nname = \" \"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_into_options() {
        let config = RowmapConfig::from_toml_str(
            "[table]\nname = \"SingersV2\"\n[logging]\nenabled = true\nlevel = \"debug\"\n",
        )
        .unwrap();
        let options = config.into_options().unwrap();
        assert_eq!(options.table_name(), Some("SingersV2"));
        assert!(options.log_enabled());
    }

    #[test]
    fn test_file_then_env_supersedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[table]\nname = \"FromFile\"\n[logging]\nenabled = false").unwrap();

        let config = RowmapConfig::from_file(file.path()).unwrap();
        assert_eq!(config.table.name.as_deref(), Some("FromFile"));

        std::env::set_var("ROWMAP_LOG_ENABLED", "true");
        std::env::set_var("ROWMAP_TABLE_NAME", "FromEnv");
        let config = RowmapConfig::load_from(file.path());
        std::env::remove_var("ROWMAP_LOG_ENABLED");
        std::env::remove_var("ROWMAP_TABLE_NAME");

        let config = config.unwrap();
        assert_eq!(config.table.name.as_deref(), Some("FromEnv"));
        assert!(config.logging.enabled);

        let missing = RowmapConfig::from_file(file.path().with_extension("missing"));
        assert!(missing.is_err());
    }
}
