//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use shroud::logging::init_logging;
//! use shroud::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use shroud::log_stage_start;
///
/// log_stage_start!("drop_identifiers");
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr) => {
        tracing::debug!(stage = %$stage, "Starting stage");
    };
}

/// Log a technique applied to a column
///
/// # Example
///
/// ```no_run
/// use shroud::log_technique_applied;
///
/// log_technique_applied!("masking", "email", 1);
/// ```
#[macro_export]
macro_rules! log_technique_applied {
    ($technique:expr, $column:expr, $changes:expr) => {
        tracing::info!(
            technique = %$technique,
            column = %$column,
            changes = $changes,
            "Technique applied"
        );
    };
}

/// Log the completion of an anonymization run
///
/// # Example
///
/// ```no_run
/// use shroud::log_run_complete;
/// use std::time::Duration;
///
/// let rows = 42;
/// let duration = Duration::from_millis(12);
/// log_run_complete!(rows, duration);
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($rows:expr, $duration:expr) => {
        tracing::info!(
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Anonymization completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use shroud::log_error_with_context;
/// use shroud::domain::ShroudError;
///
/// let error = ShroudError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
