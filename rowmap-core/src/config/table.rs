//! Table naming configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Overrides the declared or derived table name
    pub name: Option<String>,
}

impl TableConfig {
    pub fn merge(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(name) = env::var("ROWMAP_TABLE_NAME") {
            self.name = Some(name);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                bail!("table name must not be empty");
            }
        }
        Ok(())
    }
}
