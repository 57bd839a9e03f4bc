//! Suppression strategy

use super::{AnonymizedColumn, Anonymizer, TransformContext};
use crate::anonymization::config::{TechniqueKind, TechniqueParams, DEFAULT_THRESHOLD};
use crate::domain::value::format_bound;
use crate::domain::{Result, ShroudError, Value};
use rand::seq::index;
use rand::Rng;

/// Symbol written over suppressed cells
pub const MASK_SYMBOL: &str = "*";

/// Result of [`suppress`]
#[derive(Debug, Clone, PartialEq)]
pub struct Suppression {
    /// Transformed column
    pub values: Vec<Value>,
    /// Suppressed row positions, ascending
    pub positions: Vec<usize>,
}

/// Number of cells suppression masks for `rows` rows
pub fn suppressed_count(rows: usize, threshold: f64) -> usize {
    ((rows as f64 * threshold).round() as usize).min(rows)
}

/// Masks `round(n * threshold)` cells chosen uniformly without replacement
///
/// # Errors
///
/// Returns [`ShroudError::InvalidParameter`] when `threshold` is outside `[0, 1]`.
pub fn suppress<R: Rng + ?Sized>(
    values: &[Value],
    threshold: f64,
    rng: &mut R,
) -> Result<Suppression> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ShroudError::invalid_parameter(
            TechniqueKind::Suppression.as_str(),
            "threshold",
            format!("must be within [0, 1], found {threshold}"),
        ));
    }

    let amount = suppressed_count(values.len(), threshold);
    let mut positions = index::sample(rng, values.len(), amount).into_vec();
    positions.sort_unstable();

    let mut suppressed = values.to_vec();
    for &position in &positions {
        suppressed[position] = Value::text(MASK_SYMBOL);
    }

    Ok(Suppression {
        values: suppressed,
        positions,
    })
}

/// Suppression strategy - replaces a random share of cells with `*`
pub struct SuppressionStrategy {
    threshold: f64,
}

impl SuppressionStrategy {
    /// Create a new suppression strategy
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Build from technique parameters (`threshold`)
    pub fn from_params(params: &TechniqueParams) -> Result<Self> {
        Ok(Self::new(params.get_f64(
            TechniqueKind::Suppression.as_str(),
            "threshold",
            DEFAULT_THRESHOLD,
        )?))
    }
}

impl Anonymizer for SuppressionStrategy {
    fn technique(&self) -> TechniqueKind {
        TechniqueKind::Suppression
    }

    fn anonymize_column(
        &mut self,
        values: &[Value],
        ctx: &mut TransformContext<'_>,
    ) -> Result<AnonymizedColumn> {
        let result = suppress(values, self.threshold, ctx.rng)?;
        let change = format!(
            "Hid {} value(s) ({}%) using '{}'",
            result.positions.len(),
            format_bound(self.threshold * 100.0),
            MASK_SYMBOL
        );
        Ok(AnonymizedColumn::new(
            result.values,
            vec![change],
            "A random share of the values was hidden to reduce the chance of direct identification.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn column(n: usize) -> Vec<Value> {
        (0..n).map(|i| Value::text(format!("value-{i}"))).collect()
    }

    #[test]
    fn test_suppresses_rounded_share() {
        let mut rng = StdRng::seed_from_u64(7);
        for (rows, threshold, expected) in [(8, 0.3, 2), (10, 0.25, 3), (10, 1.0, 10), (3, 0.5, 2)] {
            let values = column(rows);
            let result = suppress(&values, threshold, &mut rng).unwrap();
            let masked = result
                .values
                .iter()
                .filter(|v| **v == Value::text(MASK_SYMBOL))
                .count();
            assert_eq!(masked, expected, "rows={rows} threshold={threshold}");
            assert_eq!(result.positions.len(), expected);
        }
    }

    #[test]
    fn test_unsuppressed_cells_are_untouched() {
        let mut rng = StdRng::seed_from_u64(11);
        let values = column(20);
        let result = suppress(&values, 0.4, &mut rng).unwrap();
        for (position, (before, after)) in values.iter().zip(&result.values).enumerate() {
            if result.positions.contains(&position) {
                assert_eq!(*after, Value::text(MASK_SYMBOL));
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_zero_threshold_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let values = column(5);
        let result = suppress(&values, 0.0, &mut rng).unwrap();
        assert_eq!(result.values, values);
        assert!(result.positions.is_empty());
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(suppress(&column(3), -0.1, &mut rng).is_err());
        assert!(suppress(&column(3), 1.1, &mut rng).is_err());
        assert!(suppress(&column(3), f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_empty_column() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = suppress(&[], 0.5, &mut rng).unwrap();
        assert!(result.values.is_empty());
    }
}
