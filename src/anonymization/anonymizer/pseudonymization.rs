//! Pseudonymization strategy
//!
//! Replaces each distinct value with a consistent synthetic identifier
//! (`PREFIX_N`). Identifiers are handed out in first-appearance order.

use super::{AnonymizedColumn, Anonymizer, TransformContext};
use crate::anonymization::config::{TechniqueKind, TechniqueParams, DEFAULT_PREFIX};
use crate::domain::{Result, Value};
use std::collections::HashMap;

/// Source of pseudonyms, keyed by prefix
///
/// The engine creates a fresh [`SessionPseudonyms`] for every technique
/// application. Callers that want stable identifiers across runs supply their
/// own store through
/// [`AnonymizationEngine::process_with_store`](crate::anonymization::AnonymizationEngine::process_with_store).
pub trait PseudonymStore: Send {
    /// Pseudonym for `value` under `prefix`, assigning the next one if unseen
    fn pseudonym_for(&mut self, prefix: &str, value: &Value) -> String;

    /// Number of pseudonyms assigned under `prefix`
    fn assigned(&self, prefix: &str) -> usize;
}

/// In-memory pseudonym mappings that live for one session
#[derive(Debug, Default, Clone)]
pub struct SessionPseudonyms {
    mappings: HashMap<String, HashMap<Value, String>>,
}

impl SessionPseudonyms {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PseudonymStore for SessionPseudonyms {
    fn pseudonym_for(&mut self, prefix: &str, value: &Value) -> String {
        let mapping = self.mappings.entry(prefix.to_string()).or_default();
        if let Some(existing) = mapping.get(value) {
            return existing.clone();
        }
        let pseudonym = format!("{}_{}", prefix, mapping.len() + 1);
        mapping.insert(value.clone(), pseudonym.clone());
        pseudonym
    }

    fn assigned(&self, prefix: &str) -> usize {
        self.mappings.get(prefix).map(HashMap::len).unwrap_or(0)
    }
}

/// Replaces non-null values with pseudonyms from `store`
pub fn pseudonymize(values: &[Value], prefix: &str, store: &mut dyn PseudonymStore) -> Vec<Value> {
    values
        .iter()
        .map(|value| match value {
            Value::Null => Value::Null,
            other => Value::Text(store.pseudonym_for(prefix, other)),
        })
        .collect()
}

/// Pseudonymization strategy - replaces values with `PREFIX_N` identifiers
pub struct PseudonymizationStrategy {
    prefix: String,
}

impl PseudonymizationStrategy {
    /// Create a new pseudonymization strategy
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Build from technique parameters (`prefix`)
    pub fn from_params(params: &TechniqueParams) -> Result<Self> {
        Ok(Self::new(params.get_str(
            TechniqueKind::Pseudonymization.as_str(),
            "prefix",
            DEFAULT_PREFIX,
        )?))
    }
}

impl Default for PseudonymizationStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Anonymizer for PseudonymizationStrategy {
    fn technique(&self) -> TechniqueKind {
        TechniqueKind::Pseudonymization
    }

    fn anonymize_column(
        &mut self,
        values: &[Value],
        ctx: &mut TransformContext<'_>,
    ) -> Result<AnonymizedColumn> {
        let before = ctx.pseudonyms.assigned(&self.prefix);
        let pseudonymized = pseudonymize(values, &self.prefix, ctx.pseudonyms);
        let created = ctx.pseudonyms.assigned(&self.prefix) - before;

        let mut changes = vec![format!(
            "Replaced values with {} pseudonym(s) of the form {}_N",
            created, self.prefix
        )];
        if let Some((original, pseudonym)) = values
            .iter()
            .zip(&pseudonymized)
            .find(|(original, _)| !original.is_null())
        {
            changes.push(format!("Example: {original} → {pseudonym}"));
        }

        Ok(AnonymizedColumn::new(
            pseudonymized,
            changes,
            "Each value was replaced by a consistent synthetic identifier, so equal values stay linked without revealing the original.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_appearance_order() {
        let mut store = SessionPseudonyms::new();
        let values = vec![
            Value::text("Ana"),
            Value::text("Luis"),
            Value::text("Ana"),
            Value::Null,
            Value::text("Eva"),
        ];
        let result = pseudonymize(&values, "ID", &mut store);
        assert_eq!(
            result,
            vec![
                Value::text("ID_1"),
                Value::text("ID_2"),
                Value::text("ID_1"),
                Value::Null,
                Value::text("ID_3"),
            ]
        );
        assert_eq!(store.assigned("ID"), 3);
    }

    #[test]
    fn test_bijection_over_observed_values() {
        let mut store = SessionPseudonyms::new();
        let values: Vec<Value> = (0..50).map(|i| Value::Int(i % 17)).collect();
        let result = pseudonymize(&values, "P", &mut store);

        let distinct_in: HashSet<_> = values.iter().collect();
        let distinct_out: HashSet<_> = result.iter().collect();
        assert_eq!(distinct_in.len(), distinct_out.len());

        for (a, b) in values.iter().zip(&result) {
            for (c, d) in values.iter().zip(&result) {
                assert_eq!(a == c, b == d);
            }
        }
    }

    #[test]
    fn test_prefixes_are_independent() {
        let mut store = SessionPseudonyms::new();
        assert_eq!(store.pseudonym_for("A", &Value::text("x")), "A_1");
        assert_eq!(store.pseudonym_for("B", &Value::text("x")), "B_1");
        assert_eq!(store.pseudonym_for("A", &Value::text("y")), "A_2");
        assert_eq!(store.assigned("C"), 0);
    }

    #[test]
    fn test_numbers_and_text_are_distinct_values() {
        let mut store = SessionPseudonyms::new();
        let result = pseudonymize(&[Value::Int(1), Value::text("1")], "ID", &mut store);
        assert_ne!(result[0], result[1]);
    }
}
