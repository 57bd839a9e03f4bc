//! Anonymization job configuration
//!
//! A job configuration declares a role per column, an ordered list of
//! per-column techniques and the global k/l targets. It can be embedded in the
//! `[anonymization]` section of `shroud.toml` or supplied as a JSON record.

use crate::anonymization::anonymizer::masking::MaskMode;
use crate::domain::errors::ShroudError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ColumnRole {
    /// Directly identifying; dropped before anything else runs
    #[serde(rename = "identifier")]
    Identifier,
    /// Identifying in combination with other columns
    #[serde(rename = "quasi-identifier")]
    QuasiIdentifier,
    /// Private attribute whose diversity is measured
    #[serde(rename = "sensitive")]
    Sensitive,
    /// Untouched by role-driven stages
    #[default]
    #[serde(rename = "none", other)]
    None,
}

/// Role declaration for a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column name
    pub column: String,
    /// Declared role
    #[serde(rename = "type")]
    pub role: ColumnRole,
}

impl ColumnMapping {
    /// Create a new mapping
    pub fn new(column: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            column: column.into(),
            role,
        }
    }
}

/// Kind of per-column technique
///
/// Kinds the engine does not know are preserved as [`TechniqueKind::Unrecognized`]
/// so the orchestrator can skip and report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TechniqueKind {
    /// Numeric binning or categorical collapsing
    Generalization,
    /// Random masking of a fraction of cells
    Suppression,
    /// Consistent synthetic identifiers
    Pseudonymization,
    /// Partial character masking
    Masking,
    /// Laplace noise injection
    DifferentialPrivacy,
    /// Any other technique name
    Unrecognized(String),
}

impl TechniqueKind {
    /// Wire name of the technique, also used in detail keys
    pub fn as_str(&self) -> &str {
        match self {
            Self::Generalization => "generalization",
            Self::Suppression => "suppression",
            Self::Pseudonymization => "pseudonymization",
            Self::Masking => "masking",
            Self::DifferentialPrivacy => "differential_privacy",
            Self::Unrecognized(name) => name,
        }
    }

    /// Human-readable technique name for detail records
    pub fn label(&self) -> &str {
        match self {
            Self::Generalization => "Generalization",
            Self::Suppression => "Suppression",
            Self::Pseudonymization => "Pseudonymization",
            Self::Masking => "Masking",
            Self::DifferentialPrivacy => "Differential Privacy",
            Self::Unrecognized(name) => name,
        }
    }

    /// Returns true when the engine knows how to apply this kind
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for TechniqueKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "generalization" => Self::Generalization,
            "suppression" => Self::Suppression,
            "pseudonymization" => Self::Pseudonymization,
            "masking" => Self::Masking,
            "differential_privacy" => Self::DifferentialPrivacy,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for TechniqueKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TechniqueKind> for String {
    fn from(value: TechniqueKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named technique options
///
/// Parameters stay loosely typed on the wire; accessors enforce the expected
/// type and fall back to the documented default when a key is absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechniqueParams(pub serde_json::Map<String, serde_json::Value>);

impl TechniqueParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// True when no parameter is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw access to a parameter
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Non-negative integer parameter
    pub fn get_usize(&self, technique: &str, key: &str, default: usize) -> Result<usize> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(value) => value
                .as_u64()
                .or_else(|| {
                    value
                        .as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                        .map(|f| f as u64)
                })
                .map(|v| v as usize)
                .ok_or_else(|| {
                    ShroudError::invalid_parameter(
                        technique,
                        key,
                        format!("expected a non-negative integer, found {value}"),
                    )
                }),
        }
    }

    /// Floating point parameter
    pub fn get_f64(&self, technique: &str, key: &str, default: f64) -> Result<f64> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(value) => value.as_f64().ok_or_else(|| {
                ShroudError::invalid_parameter(
                    technique,
                    key,
                    format!("expected a number, found {value}"),
                )
            }),
        }
    }

    /// String parameter
    pub fn get_str(&self, technique: &str, key: &str, default: &str) -> Result<String> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default.to_string()),
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(value) => Err(ShroudError::invalid_parameter(
                technique,
                key,
                format!("expected a string, found {value}"),
            )),
        }
    }
}

/// One technique application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueSpec {
    /// Target column
    pub column: String,
    /// Technique to apply
    pub technique: TechniqueKind,
    /// Technique options
    #[serde(default)]
    pub params: TechniqueParams,
}

impl TechniqueSpec {
    /// Create a new technique spec
    pub fn new(column: impl Into<String>, technique: impl Into<TechniqueKind>) -> Self {
        Self {
            column: column.into(),
            technique: technique.into(),
            params: TechniqueParams::new(),
        }
    }

    /// Builder-style parameter
    pub fn param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params = self.params.with(key, value);
        self
    }

    /// Checks the parameters a recognized technique will read
    ///
    /// Unrecognized techniques are not validated; the engine skips them.
    pub fn validate(&self) -> Result<()> {
        if self.column.trim().is_empty() {
            return Err(ShroudError::Validation(
                "technique column must not be empty".to_string(),
            ));
        }

        let name = self.technique.as_str();
        match self.technique {
            TechniqueKind::Generalization => {
                self.params.get_usize(name, "bins", DEFAULT_BINS)?;
                self.params.get_usize(name, "levels", DEFAULT_LEVELS)?;
            }
            TechniqueKind::Suppression => {
                let threshold = self.params.get_f64(name, "threshold", DEFAULT_THRESHOLD)?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(ShroudError::invalid_parameter(
                        name,
                        "threshold",
                        format!("must be within [0, 1], found {threshold}"),
                    ));
                }
            }
            TechniqueKind::DifferentialPrivacy => {
                let epsilon = self.params.get_f64(name, "epsilon", DEFAULT_EPSILON)?;
                if !epsilon.is_finite() || epsilon <= 0.0 {
                    return Err(ShroudError::invalid_parameter(
                        name,
                        "epsilon",
                        format!("must be a positive number, found {epsilon}"),
                    ));
                }
            }
            TechniqueKind::Masking => {
                let mode = self.params.get_str(name, "mask_type", DEFAULT_MASK_TYPE)?;
                mode.parse::<MaskMode>()?;
            }
            TechniqueKind::Pseudonymization => {
                let prefix = self.params.get_str(name, "prefix", DEFAULT_PREFIX)?;
                if prefix.is_empty() {
                    return Err(ShroudError::invalid_parameter(
                        name,
                        "prefix",
                        "must not be empty",
                    ));
                }
            }
            TechniqueKind::Unrecognized(_) => {}
        }
        Ok(())
    }
}

/// Default number of numeric generalization bins
pub const DEFAULT_BINS: usize = 5;
/// Default number of categorical generalization levels
pub const DEFAULT_LEVELS: usize = 1;
/// Default suppression threshold
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Default differential privacy epsilon
pub const DEFAULT_EPSILON: f64 = 1.0;
/// Default masking mode
pub const DEFAULT_MASK_TYPE: &str = "partial";
/// Default pseudonym prefix
pub const DEFAULT_PREFIX: &str = "ID";

/// Global privacy targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParams {
    /// Target minimum group size
    #[serde(default = "default_k")]
    pub k: usize,

    /// Target minimum distinct sensitive values per group
    #[serde(default = "default_l")]
    pub l: usize,
}

fn default_k() -> usize {
    2
}

fn default_l() -> usize {
    2
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            k: default_k(),
            l: default_l(),
        }
    }
}

/// Complete anonymization job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Optional human-readable job name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Role declarations
    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,

    /// Techniques in application order
    #[serde(default)]
    pub techniques: Vec<TechniqueSpec>,

    /// Global k/l targets
    #[serde(default)]
    pub global_params: GlobalParams,
}

impl AnonymizationConfig {
    /// Parses a job from a JSON record
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for mapping in &self.column_mappings {
            if mapping.column.trim().is_empty() {
                return Err(ShroudError::Validation(
                    "column mapping with empty column name".to_string(),
                ));
            }
        }
        for spec in &self.techniques {
            spec.validate()?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("SHROUD_ANONYMIZATION_K") {
            self.global_params.k = val.parse().map_err(|_| {
                ShroudError::Configuration(format!("Invalid SHROUD_ANONYMIZATION_K value: {val}"))
            })?;
        }

        if let Ok(val) = std::env::var("SHROUD_ANONYMIZATION_L") {
            self.global_params.l = val.parse().map_err(|_| {
                ShroudError::Configuration(format!("Invalid SHROUD_ANONYMIZATION_L value: {val}"))
            })?;
        }

        Ok(())
    }
}
