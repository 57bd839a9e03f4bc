//! Scalar cell values
//!
//! A [`Value`] is one cell of a [`Table`](super::table::Table). Values are
//! hashable so they can be used directly as group keys when measuring
//! k-anonymity and l-diversity.

use crate::domain::errors::ShroudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single scalar cell
///
/// JSON numbers without a fractional part deserialize as [`Value::Int`];
/// everything else numeric becomes [`Value::Float`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean flag (treated as categorical)
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Free text
    Text(String),
}

impl Value {
    /// Creates a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Returns true for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `Int` and `Float`
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view of the value, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value to its plain textual form, keeping nulls as nulls
    pub fn to_text(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Text(_) => self.clone(),
            other => Value::Text(other.to_string()),
        }
    }

    fn normalized_bits(f: f64) -> u64 {
        if f == 0.0 {
            0.0f64.to_bits()
        } else if f.is_nan() {
            f64::NAN.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                Self::normalized_bits(*a) == Self::normalized_bits(*b)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => Self::normalized_bits(*f).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ShroudError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(ShroudError::MalformedData(format!(
                        "Number out of range: {n}"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            other => Err(ShroudError::MalformedData(format!(
                "Expected a scalar cell value, found {other}"
            ))),
        }
    }
}

/// Formats a numeric bound for display in an interval label
///
/// Whole numbers print without decimals, everything else with at most two.
pub fn format_bound(value: f64) -> String {
    format_bound_with(value, 2)
}

/// Like [`format_bound`] with at most `decimals` decimal places
pub fn format_bound_with(value: f64, decimals: usize) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rounded = format!("{value:.decimals$}");
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Decimal places that keep edges `width` apart distinguishable
///
/// At least two, one more than the position of the first significant digit of
/// `width`, capped at [`MAX_BOUND_DECIMALS`].
pub fn bound_decimals(width: f64) -> usize {
    if !width.is_finite() || width <= 0.0 {
        return 2;
    }
    let needed = (-width.log10()).ceil() + 1.0;
    if needed <= 2.0 {
        2
    } else {
        (needed as usize).min(MAX_BOUND_DECIMALS)
    }
}

/// Upper limit for [`bound_decimals`]
pub const MAX_BOUND_DECIMALS: usize = 12;
