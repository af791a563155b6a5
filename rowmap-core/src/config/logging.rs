//! Access logging configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Level used when forwarding to the `log` facade
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "info".to_string() }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(enabled) = env::var("ROWMAP_LOG_ENABLED") {
            self.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Ok(level) = env::var("ROWMAP_LOG_LEVEL") {
            self.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.log_level().map(|_| ())
    }

    pub fn log_level(&self) -> Result<log::Level> {
        match log::Level::from_str(&self.level) {
            Ok(level) => Ok(level),
            Err(_) => bail!(
                "invalid log level `{}`, expected one of error, warn, info, debug, trace",
                self.level
            ),
        }
    }
}
