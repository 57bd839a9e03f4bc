//! Generalization strategy
//!
//! Numeric columns are binned into equal-width intervals labelled with their
//! literal bounds (`"28-35"`). Categorical columns keep their most frequent
//! values and collapse the rest into a single overflow label.

use super::{example_change, AnonymizedColumn, Anonymizer, TransformContext};
use crate::anonymization::config::{TechniqueKind, TechniqueParams, DEFAULT_BINS, DEFAULT_LEVELS};
use crate::domain::table::{is_numeric_column, numeric_range};
use crate::domain::value::{bound_decimals, format_bound_with, Value};
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Label used when every categorical value collapses into one
pub const GENERALIZED_LABEL: &str = "Generalized";

/// Label for categorical values outside the kept top levels
pub const OTHER_LABEL: &str = "Other";

/// One interval produced by numeric binning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeMapping {
    /// Literal interval label written into the column
    pub label: String,
    /// Lower bound (exclusive except for the first interval)
    pub lower: f64,
    /// Upper bound (inclusive)
    pub upper: f64,
    /// Number of rows that fell into the interval
    pub count: usize,
}

/// Why numeric binning could not proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// `bins` was zero
    ZeroBins,
    /// The column holds non-numeric cells or no numbers at all
    NotNumeric,
    /// The column holds NaN or infinite values
    NonFinite,
    /// Every numeric cell has the same value
    SingleValue,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ZeroBins => "bin count is zero",
            Self::NotNumeric => "column is not numeric",
            Self::NonFinite => "column contains non-finite values",
            Self::SingleValue => "column has a single distinct value",
        };
        f.write_str(text)
    }
}

/// What numeric generalization did
#[derive(Debug, Clone, PartialEq)]
pub enum GeneralizationOutcome {
    /// Values were replaced by interval labels
    Binned { intervals: Vec<RangeMapping> },
    /// Values were converted to their textual form unchanged
    Fallback { reason: FallbackReason },
}

/// Result of [`generalize_numeric`]
#[derive(Debug, Clone, PartialEq)]
pub struct NumericGeneralization {
    /// Transformed column
    pub values: Vec<Value>,
    /// Binning result or fallback reason
    pub outcome: GeneralizationOutcome,
}

impl NumericGeneralization {
    /// True when the textual fallback was applied
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, GeneralizationOutcome::Fallback { .. })
    }

    fn fallback(values: &[Value], reason: FallbackReason) -> Self {
        Self {
            values: values.iter().map(Value::to_text).collect(),
            outcome: GeneralizationOutcome::Fallback { reason },
        }
    }
}

/// Bins a numeric column into at most `bins` equal-width intervals
///
/// Edges are `min + i * (max - min) / bins`; integer-valued columns get
/// their edges rounded to whole numbers. Label bounds carry enough decimals to
/// tell adjacent edges apart. Consecutive equal edges are merged,
/// so fewer than `bins` intervals may come out. Intervals are right-closed and
/// the first one also includes the minimum. Nulls stay null.
///
/// This never fails: when binning is impossible every value is converted to
/// its plain textual form and the outcome records why.
///
/// # Examples
///
/// ```
/// use shroud::anonymization::anonymizer::generalization::generalize_numeric;
/// use shroud::domain::Value;
///
/// let ages: Vec<Value> = [28, 35, 42, 50].into_iter().map(Value::Int).collect();
/// let result = generalize_numeric(&ages, 3);
/// assert_eq!(result.values[0], Value::text("28-35"));
/// assert_eq!(result.values[3], Value::text("43-50"));
/// ```
pub fn generalize_numeric(values: &[Value], bins: usize) -> NumericGeneralization {
    if bins == 0 {
        return NumericGeneralization::fallback(values, FallbackReason::ZeroBins);
    }
    if !is_numeric_column(values) {
        return NumericGeneralization::fallback(values, FallbackReason::NotNumeric);
    }
    if values
        .iter()
        .filter_map(Value::as_f64)
        .any(|v| !v.is_finite())
    {
        return NumericGeneralization::fallback(values, FallbackReason::NonFinite);
    }
    let (min, max) = match numeric_range(values) {
        Some(range) => range,
        None => return NumericGeneralization::fallback(values, FallbackReason::NotNumeric),
    };
    if min == max {
        return NumericGeneralization::fallback(values, FallbackReason::SingleValue);
    }

    let integral = values
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Null));
    let width = (max - min) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .map(|edge| if integral { edge.round() } else { edge })
        .collect();
    edges.dedup();
    let decimals = bound_decimals(width);

    let mut intervals: Vec<RangeMapping> = edges
        .windows(2)
        .map(|pair| RangeMapping {
            label: format!(
                "{}-{}",
                format_bound_with(pair[0], decimals),
                format_bound_with(pair[1], decimals)
            ),
            lower: pair[0],
            upper: pair[1],
            count: 0,
        })
        .collect();

    let last = intervals.len() - 1;
    let binned = values
        .iter()
        .map(|value| match value.as_f64() {
            Some(v) => {
                let index = intervals
                    .iter()
                    .position(|interval| v <= interval.upper)
                    .unwrap_or(last);
                intervals[index].count += 1;
                Value::text(intervals[index].label.clone())
            }
            None => Value::Null,
        })
        .collect();

    NumericGeneralization {
        values: binned,
        outcome: GeneralizationOutcome::Binned { intervals },
    }
}

/// Keeps the `levels` most frequent values and collapses the rest
///
/// With `levels == 1` every cell (nulls included) becomes
/// [`GENERALIZED_LABEL`]. Otherwise non-null values are ranked by frequency,
/// ties broken by first appearance, and everything outside the top `levels`
/// becomes [`OTHER_LABEL`].
pub fn generalize_categorical(values: &[Value], levels: usize) -> Vec<Value> {
    if levels == 1 {
        return vec![Value::text(GENERALIZED_LABEL); values.len()];
    }

    let mut counts: HashMap<&Value, (usize, usize)> = HashMap::new();
    for (position, value) in values.iter().enumerate() {
        if value.is_null() {
            continue;
        }
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&Value, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    let kept: HashSet<&Value> = ranked.into_iter().take(levels).map(|(v, _)| v).collect();

    values
        .iter()
        .map(|value| {
            if kept.contains(value) {
                value.clone()
            } else {
                Value::text(OTHER_LABEL)
            }
        })
        .collect()
}

/// Generalization strategy - numeric binning or categorical collapsing
pub struct GeneralizationStrategy {
    bins: usize,
    levels: usize,
}

impl GeneralizationStrategy {
    /// Create a new generalization strategy
    pub fn new(bins: usize, levels: usize) -> Self {
        Self { bins, levels }
    }

    /// Build from technique parameters (`bins`, `levels`)
    pub fn from_params(params: &TechniqueParams) -> Result<Self> {
        let name = TechniqueKind::Generalization.as_str();
        Ok(Self::new(
            params.get_usize(name, "bins", DEFAULT_BINS)?,
            params.get_usize(name, "levels", DEFAULT_LEVELS)?,
        ))
    }
}

impl Anonymizer for GeneralizationStrategy {
    fn technique(&self) -> TechniqueKind {
        TechniqueKind::Generalization
    }

    fn anonymize_column(
        &mut self,
        values: &[Value],
        _ctx: &mut TransformContext<'_>,
    ) -> Result<AnonymizedColumn> {
        if !is_numeric_column(values) {
            let generalized = generalize_categorical(values, self.levels);
            let changes = example_change(values, &generalized).into_iter().collect();
            return Ok(AnonymizedColumn::new(
                generalized,
                changes,
                "Specific values were grouped into broader categories to avoid unique values.",
            ));
        }

        let result = generalize_numeric(values, self.bins);
        let mut changes: Vec<String> = example_change(values, &result.values).into_iter().collect();
        let column = match result.outcome {
            GeneralizationOutcome::Binned { intervals } => {
                changes.push(format!("Values grouped into {} interval(s)", intervals.len()));
                AnonymizedColumn::new(
                    result.values,
                    changes,
                    "Exact numeric values were replaced by ranges to reduce the level of detail.",
                )
                .with_range_mapping(intervals)
                .with_fallback(false)
            }
            GeneralizationOutcome::Fallback { reason } => {
                changes.push(format!(
                    "Binning not possible ({reason}); values kept in textual form"
                ));
                AnonymizedColumn::new(
                    result.values,
                    changes,
                    "The column could not be split into ranges, so its values were kept unchanged as text.",
                )
                .with_fallback(true)
            }
        };
        Ok(column)
    }
}
