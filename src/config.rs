// ⚙️ Site Configuration - inventory, work description, listen address
//
// Loaded once at startup and never mutated afterwards.
// Every field is optional in the TOML file:
//
//   total_armbands   = 13
//   total_flags      = 10
//   work_description = "면회실 공사 작업"
//   bind_addr        = "0.0.0.0:5000"

use crate::report::{ReportFormatter, TOTAL_ARMBANDS, TOTAL_FLAGS, WORK_DESCRIPTION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub total_armbands: i64,
    pub total_flags: i64,
    pub work_description: String,
    pub bind_addr: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            total_armbands: TOTAL_ARMBANDS,
            total_flags: TOTAL_FLAGS,
            work_description: WORK_DESCRIPTION.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl SiteConfig {
    /// Defaults when `path` is None, otherwise the parsed file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;

        let config: SiteConfig = toml::from_str(&raw).map_err(|source| ConfigError::ParseToml {
            path: path.display().to_string(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_armbands < 0 {
            return Err(ConfigError::Invalid {
                field: "total_armbands",
                reason: format!("must not be negative, got {}", self.total_armbands),
            });
        }
        if self.total_flags < 0 {
            return Err(ConfigError::Invalid {
                field: "total_flags",
                reason: format!("must not be negative, got {}", self.total_flags),
            });
        }
        if self.work_description.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "work_description",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn formatter(&self) -> ReportFormatter {
        ReportFormatter::with_inventory(self.total_armbands, self.total_flags, &self.work_description)
    }
}

// ============================================================================
// TESTS
// ============================================================================
