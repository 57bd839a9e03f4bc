//! Differential privacy strategy
//!
//! Adds Laplace noise scaled by the column range over epsilon.

use super::{example_change, AnonymizedColumn, Anonymizer, TransformContext};
use crate::anonymization::config::{TechniqueKind, TechniqueParams, DEFAULT_EPSILON};
use crate::domain::table::{is_numeric_column, numeric_range};
use crate::domain::value::format_bound;
use crate::domain::{Result, ShroudError, Value};
use rand::Rng;

/// What [`add_noise`] did with a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseOutcome {
    /// Noise was added with `scale = sensitivity / epsilon`
    Applied {
        /// Column range (max - min)
        sensitivity: f64,
        /// Laplace scale
        scale: f64,
    },
    /// Column is not numeric; values returned unchanged
    NotNumeric,
    /// Column range is zero or not finite; values returned unchanged
    ZeroSensitivity,
}

/// Result of [`add_noise`]
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseInjection {
    /// Transformed column
    pub values: Vec<Value>,
    /// What happened
    pub outcome: NoiseOutcome,
}

/// Draws one sample from Laplace(0, scale) by inverting its CDF
pub fn sample_laplace<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    loop {
        let u: f64 = rng.gen_range(-0.5..0.5);
        if u.abs() < 0.5 {
            return -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln();
        }
    }
}

/// Adds independent Laplace noise to each numeric cell
///
/// # Errors
///
/// Returns [`ShroudError::InvalidParameter`] unless `epsilon` is finite and
/// positive.
pub fn add_noise<R: Rng + ?Sized>(
    values: &[Value],
    epsilon: f64,
    rng: &mut R,
) -> Result<NoiseInjection> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(ShroudError::invalid_parameter(
            TechniqueKind::DifferentialPrivacy.as_str(),
            "epsilon",
            format!("must be a positive number, found {epsilon}"),
        ));
    }

    if !is_numeric_column(values) {
        return Ok(NoiseInjection {
            values: values.to_vec(),
            outcome: NoiseOutcome::NotNumeric,
        });
    }

    let sensitivity = numeric_range(values)
        .map(|(min, max)| max - min)
        .unwrap_or(0.0);
    if !sensitivity.is_finite() || sensitivity == 0.0 {
        return Ok(NoiseInjection {
            values: values.to_vec(),
            outcome: NoiseOutcome::ZeroSensitivity,
        });
    }

    let scale = sensitivity / epsilon;
    let noisy = values
        .iter()
        .map(|value| match value.as_f64() {
            Some(x) => Value::Float(x + sample_laplace(rng, scale)),
            None => Value::Null,
        })
        .collect();

    Ok(NoiseInjection {
        values: noisy,
        outcome: NoiseOutcome::Applied { sensitivity, scale },
    })
}

/// Noise strategy - perturbs numeric values with Laplace noise
pub struct NoiseStrategy {
    epsilon: f64,
}

impl NoiseStrategy {
    /// Create a new noise strategy
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Build from technique parameters (`epsilon`)
    pub fn from_params(params: &TechniqueParams) -> Result<Self> {
        Ok(Self::new(params.get_f64(
            TechniqueKind::DifferentialPrivacy.as_str(),
            "epsilon",
            DEFAULT_EPSILON,
        )?))
    }
}

impl Anonymizer for NoiseStrategy {
    fn technique(&self) -> TechniqueKind {
        TechniqueKind::DifferentialPrivacy
    }

    fn anonymize_column(
        &mut self,
        values: &[Value],
        ctx: &mut TransformContext<'_>,
    ) -> Result<AnonymizedColumn> {
        let result = add_noise(values, self.epsilon, ctx.rng)?;
        let mut changes = Vec::new();
        match result.outcome {
            NoiseOutcome::Applied { sensitivity, scale } => {
                changes.push(format!(
                    "Added Laplace noise (epsilon {}, sensitivity {}, scale {})",
                    format_bound(self.epsilon),
                    format_bound(sensitivity),
                    format_bound(scale)
                ));
                changes.extend(example_change(values, &result.values));
            }
            NoiseOutcome::NotNumeric => {
                changes.push("Column is not numeric; values left unchanged".to_string());
            }
            NoiseOutcome::ZeroSensitivity => {
                changes.push("All values are equal; no noise was needed".to_string());
            }
        }
        Ok(AnonymizedColumn::new(
            result.values,
            changes,
            "Random noise was added to each number so individual values cannot be recovered while totals stay close.",
        ))
    }
}
