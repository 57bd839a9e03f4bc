//! Anonymization strategy module
//!
//! Provides the per-column techniques a job can apply. Each technique is an
//! [`Anonymizer`] built from a [`TechniqueSpec`] and run over one column.

pub mod generalization;
pub mod masking;
pub mod noise;
pub mod pseudonymization;
pub mod suppression;

use crate::anonymization::config::{TechniqueKind, TechniqueSpec};
use crate::domain::{Result, Value};
use generalization::{GeneralizationStrategy, RangeMapping};
use masking::MaskingStrategy;
use noise::NoiseStrategy;
use pseudonymization::{PseudonymStore, PseudonymizationStrategy};
use rand::rngs::StdRng;
use suppression::SuppressionStrategy;

/// Per-call state shared by the strategies of one run
pub struct TransformContext<'a> {
    /// Random source for suppression and noise
    pub rng: &'a mut StdRng,
    /// Pseudonym mappings
    pub pseudonyms: &'a mut dyn PseudonymStore,
}

/// Output of one technique applied to one column
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizedColumn {
    /// Transformed values, same length as the input
    pub values: Vec<Value>,
    /// Human-readable change log
    pub changes: Vec<String>,
    /// Plain-language explanation of the technique
    pub explanation: String,
    /// Interval bookkeeping for numeric generalization
    pub range_mapping: Option<Vec<RangeMapping>>,
    /// Set by numeric generalization; true when the textual fallback was used
    pub fallback: Option<bool>,
}

impl AnonymizedColumn {
    /// Create a new column result
    pub fn new(values: Vec<Value>, changes: Vec<String>, explanation: &str) -> Self {
        Self {
            values,
            changes,
            explanation: explanation.to_string(),
            range_mapping: None,
            fallback: None,
        }
    }

    /// Attach the intervals produced by binning
    pub fn with_range_mapping(mut self, intervals: Vec<RangeMapping>) -> Self {
        self.range_mapping = Some(intervals);
        self
    }

    /// Mark whether the textual fallback was used
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Trait for anonymization strategy implementations
pub trait Anonymizer: Send + Sync {
    /// Technique implemented by this strategy
    fn technique(&self) -> TechniqueKind;

    /// Anonymize a column, returning values of the same length
    fn anonymize_column(
        &mut self,
        values: &[Value],
        ctx: &mut TransformContext<'_>,
    ) -> Result<AnonymizedColumn>;
}

/// Builds the strategy for a technique spec
///
/// Returns `Ok(None)` for unrecognized technique kinds. Parameter errors are
/// propagated.
pub fn for_spec(spec: &TechniqueSpec) -> Result<Option<Box<dyn Anonymizer>>> {
    let strategy: Box<dyn Anonymizer> = match &spec.technique {
        TechniqueKind::Generalization => {
            Box::new(GeneralizationStrategy::from_params(&spec.params)?)
        }
        TechniqueKind::Suppression => Box::new(SuppressionStrategy::from_params(&spec.params)?),
        TechniqueKind::Pseudonymization => {
            Box::new(PseudonymizationStrategy::from_params(&spec.params)?)
        }
        TechniqueKind::Masking => Box::new(MaskingStrategy::from_params(&spec.params)?),
        TechniqueKind::DifferentialPrivacy => Box::new(NoiseStrategy::from_params(&spec.params)?),
        TechniqueKind::Unrecognized(_) => return Ok(None),
    };
    Ok(Some(strategy))
}

/// `"Example: before → after"` for the first row, when there is one
pub fn example_change(before: &[Value], after: &[Value]) -> Option<String> {
    let (first_before, first_after) = before.first().zip(after.first())?;
    Some(format!("Example: {first_before} → {first_after}"))
}
