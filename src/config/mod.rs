//! Configuration management for Shroud.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Shroud uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for optional settings
//! - `SHROUD_*` environment overrides
//! - Validation on load, including the embedded anonymization job
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shroud::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("shroud.toml")?;
//! println!("Log level: {}", config.application.log_level);
//! if let Some(job) = &config.anonymization {
//!     println!("Techniques: {}", job.techniques.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`EngineConfig`] - Engine settings (random seed)
//! - [`LoggingConfig`] - Logging configuration
//! - `anonymization` - Optional default [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig)
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [engine]
//! seed = 42
//!
//! [logging]
//! local_enabled = true
//! local_path = "${SHROUD_LOG_DIR}"
//!
//! [[anonymization.column_mappings]]
//! column = "id"
//! type = "identifier"
//!
//! [[anonymization.techniques]]
//! column = "age"
//! technique = "generalization"
//! params = { bins = 3 }
//!
//! [anonymization.global_params]
//! k = 2
//! l = 2
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_job, parse_config};
pub use schema::{ApplicationConfig, EngineConfig, LoggingConfig, ShroudConfig};
