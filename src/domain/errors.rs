//! Domain error types
//!
//! This module defines the error hierarchy for Shroud.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Shroud error type
///
/// This is the primary error type used by the anonymization core and the
/// configuration layer. Conditions the engine deliberately tolerates (unknown
/// technique kinds, specs naming absent columns, generalization fallback) are
/// never reported through this type.
#[derive(Debug, Error)]
pub enum ShroudError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A column required by an operation is not present in the table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A technique parameter is missing its expected type or range
    #[error("Invalid parameter '{parameter}' for {technique}: {message}")]
    InvalidParameter {
        technique: String,
        parameter: String,
        message: String,
    },

    /// Input data cannot be represented as a table
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ShroudError {
    /// Creates an [`ShroudError::InvalidParameter`]
    pub fn invalid_parameter(
        technique: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ShroudError::InvalidParameter {
            technique: technique.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ShroudError {
    fn from(err: std::io::Error) -> Self {
        ShroudError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ShroudError {
    fn from(err: serde_json::Error) -> Self {
        ShroudError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ShroudError {
    fn from(err: toml::de::Error) -> Self {
        ShroudError::Configuration(format!("TOML parse error: {err}"))
    }
}
