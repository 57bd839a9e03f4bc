//! Technique detail reporting
//!
//! Every stage of a run records what it changed and why. Details are kept in
//! insertion order and keyed per application, so applying the same technique
//! to the same column twice leaves a single entry holding the latest result.

use crate::anonymization::anonymizer::generalization::RangeMapping;
use crate::anonymization::config::TechniqueParams;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Key of the sentinel detail emitted when nothing changed
pub const NO_CHANGES_KEY: &str = "no_changes";

/// Key of the k-anonymity pass detail
pub const K_ANONYMITY_KEY: &str = "k_anonymity";

/// Key of the first l-diversity pass detail
pub const L_DIVERSITY_KEY: &str = "l_diversity";

/// What one stage did
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TechniqueDetail {
    /// Human-readable technique name
    pub technique: String,

    /// Column the technique was applied to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Parameters as supplied in the job
    #[serde(default, skip_serializing_if = "TechniqueParams::is_empty")]
    pub params: TechniqueParams,

    /// Change log, one entry per observable change
    #[serde(default)]
    pub changes: Vec<String>,

    /// Plain-language explanation
    #[serde(default)]
    pub explanation: String,

    /// Target minimum group size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_k: Option<usize>,

    /// Achieved minimum group size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_k: Option<usize>,

    /// Target minimum diversity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_l: Option<usize>,

    /// Achieved minimum diversity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_l: Option<f64>,

    /// Quasi-identifiers used for grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quasi_identifiers: Option<Vec<String>>,

    /// Sensitive column examined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive_attribute: Option<String>,

    /// Detail-level error; the run continued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Intervals produced by numeric generalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_mapping: Option<Vec<RangeMapping>>,

    /// True when numeric generalization fell back to text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl TechniqueDetail {
    /// Create a new detail
    pub fn new(technique: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            technique: technique.into(),
            explanation: explanation.into(),
            ..Default::default()
        }
    }

    /// Set the column
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the parameters
    pub fn with_params(mut self, params: TechniqueParams) -> Self {
        self.params = params;
        self
    }

    /// Set the change log
    pub fn with_changes(mut self, changes: Vec<String>) -> Self {
        self.changes = changes;
        self
    }

    /// Record target and achieved k
    pub fn with_k(mut self, target: usize, achieved: usize) -> Self {
        self.target_k = Some(target);
        self.achieved_k = Some(achieved);
        self
    }

    /// Record target and achieved l
    pub fn with_l(mut self, target: usize, achieved: f64) -> Self {
        self.target_l = Some(target);
        self.achieved_l = Some(achieved);
        self
    }

    /// Set the grouping columns
    pub fn with_quasi_identifiers(mut self, columns: Vec<String>) -> Self {
        self.quasi_identifiers = Some(columns);
        self
    }

    /// Set the sensitive column
    pub fn with_sensitive_attribute(mut self, column: impl Into<String>) -> Self {
        self.sensitive_attribute = Some(column.into());
        self
    }

    /// Set a detail-level error
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Insertion-ordered collection of technique details
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TechniqueDetails {
    entries: Vec<(String, TechniqueDetail)>,
}

impl TechniqueDetails {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a detail; an existing key is overwritten in place
    pub fn insert(&mut self, key: impl Into<String>, detail: TechniqueDetail) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = detail,
            None => self.entries.push((key, detail)),
        }
    }

    /// Detail for a key
    pub fn get(&self, key: &str) -> Option<&TechniqueDetail> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, detail)| detail)
    }

    /// True if the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TechniqueDetail)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TechniqueDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, detail) in &self.entries {
            map.serialize_entry(key, detail)?;
        }
        map.end()
    }
}

struct DetailsVisitor;

impl<'de> Visitor<'de> for DetailsVisitor {
    type Value = TechniqueDetails;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of technique details")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut details = TechniqueDetails::new();
        while let Some((key, detail)) = access.next_entry::<String, TechniqueDetail>()? {
            details.insert(key, detail);
        }
        Ok(details)
    }
}

impl<'de> Deserialize<'de> for TechniqueDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DetailsVisitor)
    }
}
