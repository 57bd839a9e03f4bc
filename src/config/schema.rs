//! Configuration schema types
//!
//! This module defines the structure of `shroud.toml`.

use crate::anonymization::config::AnonymizationConfig;
use serde::{Deserialize, Serialize};

/// Main Shroud configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShroudConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default anonymization job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymization: Option<AnonymizationConfig>,
}

impl ShroudConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.logging.validate()?;
        if let Some(job) = &self.anonymization {
            job.validate().map_err(|e| format!("anonymization: {e}"))?;
        }
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for suppression and noise; unset draws from entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must not be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ShroudConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "info");
        assert!(config.engine.seed.is_none());
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ShroudConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = ShroudConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("local_rotation"));
    }

    #[test]
    fn test_parse_full_toml() {
        let config: ShroudConfig = toml::from_str(
            r#"
[application]
log_level = "debug"

[engine]
seed = 42

[logging]
local_enabled = true
local_path = "/tmp/shroud"
local_rotation = "hourly"

[anonymization]
name = "patients"

[[anonymization.column_mappings]]
column = "id"
type = "identifier"

[[anonymization.techniques]]
column = "age"
technique = "generalization"
params = { bins = 3 }

[anonymization.global_params]
k = 3
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.engine.seed, Some(42));
        let job = config.anonymization.unwrap();
        assert_eq!(job.name.as_deref(), Some("patients"));
        assert_eq!(job.global_params.k, 3);
        assert_eq!(job.global_params.l, 2);
        assert_eq!(job.techniques[0].params.get_usize("generalization", "bins", 5).unwrap(), 3);
    }

    #[test]
    fn test_invalid_job_fails_validation() {
        let config: ShroudConfig = toml::from_str(
            r#"
[[anonymization.techniques]]
column = "disease"
technique = "suppression"
params = { threshold = 1.5 }
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("anonymization:"));
    }
}
