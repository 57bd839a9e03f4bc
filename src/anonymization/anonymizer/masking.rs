//! Masking strategy
//!
//! Hides most characters of a value while keeping enough of its shape to stay
//! recognisable. Values are masked on their textual form.

use super::{example_change, AnonymizedColumn, Anonymizer, TransformContext};
use crate::anonymization::config::{TechniqueKind, TechniqueParams, DEFAULT_MASK_TYPE};
use crate::domain::{Result, ShroudError, Value};
use std::fmt;
use std::str::FromStr;

const MASK_CHAR: char = '*';
const PARTIAL_FILL: &str = "***";

/// Masking mode (`mask_type` parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    /// Keep first and last character
    #[default]
    Partial,
    /// Keep first character of the local part and the whole domain
    Email,
    /// Keep the last four characters
    Phone,
}

impl MaskMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl FromStr for MaskMode {
    type Err = ShroudError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "partial" => Ok(Self::Partial),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            other => Err(ShroudError::invalid_parameter(
                TechniqueKind::Masking.as_str(),
                "mask_type",
                format!("unknown mask type '{other}' (expected partial, email or phone)"),
            )),
        }
    }
}

impl fmt::Display for MaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mask_partial(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => PARTIAL_FILL.to_string(),
        2 => format!("{}{}", chars[0], PARTIAL_FILL),
        n => format!("{}{}{}", chars[0], PARTIAL_FILL, chars[n - 1]),
    }
}

fn mask_email(text: &str) -> String {
    let Some(at) = text.rfind('@') else {
        return mask_partial(text);
    };
    let (local, domain) = text.split_at(at);
    let masked_local: String = match (local.chars().next(), local.chars().count()) {
        (None, _) => String::new(),
        (Some(_), 1) => MASK_CHAR.to_string(),
        (Some(first), count) => std::iter::once(first)
            .chain(std::iter::repeat(MASK_CHAR).take(count - 1))
            .collect(),
    };
    format!("{masked_local}{domain}")
}

fn mask_phone(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return MASK_CHAR.to_string().repeat(chars.len());
    }
    let keep = chars.len() - 4;
    std::iter::repeat(MASK_CHAR)
        .take(keep)
        .chain(chars[keep..].iter().copied())
        .collect()
}

/// Masks one string according to `mode`
pub fn mask_text(text: &str, mode: MaskMode) -> String {
    match mode {
        MaskMode::Partial => mask_partial(text),
        MaskMode::Email => mask_email(text),
        MaskMode::Phone => mask_phone(text),
    }
}

/// Masks one cell; nulls stay null
pub fn mask_value(value: &Value, mode: MaskMode) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(text) => Value::Text(mask_text(text, mode)),
        other => Value::Text(mask_text(&other.to_string(), mode)),
    }
}

/// Masks every cell of a column
pub fn mask(values: &[Value], mode: MaskMode) -> Vec<Value> {
    values.iter().map(|value| mask_value(value, mode)).collect()
}

/// Masking strategy - hides characters of each value
pub struct MaskingStrategy {
    mode: MaskMode,
}

impl MaskingStrategy {
    /// Create a new masking strategy
    pub fn new(mode: MaskMode) -> Self {
        Self { mode }
    }

    /// Build from technique parameters (`mask_type`)
    pub fn from_params(params: &TechniqueParams) -> Result<Self> {
        let mode = params
            .get_str(TechniqueKind::Masking.as_str(), "mask_type", DEFAULT_MASK_TYPE)?
            .parse()?;
        Ok(Self::new(mode))
    }
}

impl Default for MaskingStrategy {
    fn default() -> Self {
        Self::new(MaskMode::default())
    }
}

impl Anonymizer for MaskingStrategy {
    fn technique(&self) -> TechniqueKind {
        TechniqueKind::Masking
    }

    fn anonymize_column(
        &mut self,
        values: &[Value],
        _ctx: &mut TransformContext<'_>,
    ) -> Result<AnonymizedColumn> {
        let masked = mask(values, self.mode);
        let mut changes = vec![format!("Applied {} masking", self.mode)];
        changes.extend(example_change(values, &masked));
        Ok(AnonymizedColumn::new(
            masked,
            changes,
            "Part of each value was hidden with asterisks while keeping its general shape.",
        ))
    }
}
