//! Global privacy passes
//!
//! Both passes run after the per-column techniques. The k-anonymity pass
//! generalizes every quasi-identifier and overwrites whatever an earlier
//! technique left in those columns. The l-diversity pass only measures.

use crate::anonymization::anonymizer::generalization::{generalize_categorical, generalize_numeric};
use crate::anonymization::metrics::{group_by, group_diversity, k_anonymity, l_diversity};
use crate::anonymization::report::TechniqueDetail;
use crate::domain::table::{distinct_count, is_numeric_column};
use crate::domain::value::format_bound;
use crate::domain::{Result, Table};
use tracing::debug;

/// Categorical levels kept by the k-anonymity pass
pub const K_PASS_LEVELS: usize = 2;

/// Generalizes every quasi-identifier present in `table`
///
/// Numeric columns are binned into `max(2, k)` intervals, categorical ones keep
/// their two most frequent values. Returns the pass detail.
pub fn k_anonymity_pass(
    table: &mut Table,
    quasi_identifiers: &[String],
    k: usize,
) -> Result<TechniqueDetail> {
    let mut changes = Vec::new();
    let mut generalized = Vec::new();

    for column in quasi_identifiers {
        let Some(values) = table.column(column) else {
            continue;
        };
        let before = distinct_count(values);

        let replacement = if is_numeric_column(values) {
            changes.push(format!("Generalized numeric column '{column}' into ranges"));
            generalize_numeric(values, k.max(2)).values
        } else {
            changes.push(format!("Generalized categorical column '{column}'"));
            generalize_categorical(values, K_PASS_LEVELS)
        };
        let after = distinct_count(&replacement);
        changes.push(format!("→ Distinct values reduced from {before} to {after}"));
        debug!(column = %column, before, after, "Quasi-identifier generalized");

        table.replace_column(column, replacement)?;
        generalized.push(column.clone());
    }

    let achieved_k = k_anonymity(table, &generalized)?;
    let explanation = format!(
        "Records were grouped so that each row cannot be told apart from at least {} other record(s). Target K: {}. Achieved K: {}.",
        k.saturating_sub(1),
        k,
        achieved_k
    );

    Ok(TechniqueDetail::new("K-Anonymity", explanation)
        .with_k(k, achieved_k)
        .with_quasi_identifiers(quasi_identifiers.to_vec())
        .with_changes(changes))
}

/// Checks that every quasi-identifier group holds at least `l` distinct values
/// of `sensitive`
///
/// Diagnostic only: the table is not modified. A group below target adds one
/// violation to the change log. A missing sensitive column yields a detail
/// with [`TechniqueDetail::error`] set instead of failing.
pub fn l_diversity_pass(
    table: &Table,
    quasi_identifiers: &[String],
    sensitive: &str,
    l: usize,
) -> Result<TechniqueDetail> {
    let detail = TechniqueDetail::new(
        "L-Diversity",
        format!(
            "Each group of records was checked for at least {l} distinct sensitive value(s), reducing the risk of direct inference."
        ),
    )
    .with_sensitive_attribute(sensitive)
    .with_quasi_identifiers(quasi_identifiers.to_vec());

    let Some(values) = table.column(sensitive) else {
        return Ok(detail.with_error(format!(
            "Sensitive column '{sensitive}' not found in the table"
        )));
    };

    let mut violations = Vec::new();
    for group in group_by(table, quasi_identifiers)? {
        let diversity = group_diversity(&group, values);
        if diversity < l {
            violations.push(format!(
                "Group [{}] has {} distinct sensitive value(s), below the expected minimum of {}",
                group.describe(quasi_identifiers),
                diversity,
                l
            ));
        }
    }

    let achieved_l = l_diversity(table, quasi_identifiers, Some(sensitive))?;
    let explanation = format!(
        "{} Target L: {}. Achieved L: {}.",
        detail.explanation,
        l,
        format_bound(achieved_l)
    );

    Ok(TechniqueDetail {
        explanation,
        ..detail
    }
    .with_l(l, achieved_l)
    .with_changes(violations))
}
