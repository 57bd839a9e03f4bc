//! Privacy and utility metrics
//!
//! All functions are pure over one or two tables. Grouping treats `Null` as an
//! ordinary key, so rows with a missing quasi-identifier form their own group.

use crate::anonymization::roles::RoleAssignment;
use crate::domain::table::{distinct_count, is_numeric_column, numeric_range};
use crate::domain::{Result, Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Rows sharing one combination of quasi-identifier values
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    /// Quasi-identifier values, in quasi-identifier order
    pub key: Vec<&'a Value>,
    /// Row positions, ascending
    pub rows: Vec<usize>,
}

impl Group<'_> {
    /// `"age=28-35, city=Lima"` style description of the key
    pub fn describe(&self, quasi_identifiers: &[String]) -> String {
        quasi_identifiers
            .iter()
            .zip(&self.key)
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Groups rows by their quasi-identifier values, in first-appearance order
///
/// # Errors
///
/// Returns [`ShroudError::ColumnNotFound`](crate::domain::ShroudError::ColumnNotFound)
/// if a quasi-identifier is missing from the table.
pub fn group_by<'a>(table: &'a Table, quasi_identifiers: &[String]) -> Result<Vec<Group<'a>>> {
    let columns = quasi_identifiers
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<Vec<&'a Value>, usize> = HashMap::new();
    for row in 0..table.len() {
        let key: Vec<&Value> = columns.iter().map(|&values| &values[row]).collect();
        match index.get(&key) {
            Some(&position) => groups[position].rows.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    rows: vec![row],
                });
            }
        }
    }
    Ok(groups)
}

/// Smallest group size over the quasi-identifiers
///
/// Without quasi-identifiers every row is indistinguishable and the row count
/// is returned. An empty table with quasi-identifiers yields 0.
pub fn k_anonymity(table: &Table, quasi_identifiers: &[String]) -> Result<usize> {
    if quasi_identifiers.is_empty() {
        return Ok(table.len());
    }
    let groups = group_by(table, quasi_identifiers)?;
    Ok(groups.iter().map(|g| g.rows.len()).min().unwrap_or(0))
}

/// Distinct sensitive values in one group
pub fn group_diversity(group: &Group<'_>, sensitive: &[Value]) -> usize {
    group
        .rows
        .iter()
        .map(|&row| &sensitive[row])
        .collect::<HashSet<_>>()
        .len()
}

/// Smallest number of distinct sensitive values over quasi-identifier groups
///
/// Returns 0 when there are no quasi-identifiers, no sensitive column or no
/// rows.
pub fn l_diversity(
    table: &Table,
    quasi_identifiers: &[String],
    sensitive: Option<&str>,
) -> Result<f64> {
    let Some(sensitive) = sensitive else {
        return Ok(0.0);
    };
    if quasi_identifiers.is_empty() {
        return Ok(0.0);
    }
    let values = table.require_column(sensitive)?;
    let groups = group_by(table, quasi_identifiers)?;
    Ok(groups
        .iter()
        .map(|group| group_diversity(group, values))
        .min()
        .unwrap_or(0) as f64)
}

fn distinct_ratio_loss(before: &[Value], after: &[Value]) -> f64 {
    let distinct_before = distinct_count(before);
    if distinct_before == 0 {
        return 0.0;
    }
    1.0 - distinct_count(after) as f64 / distinct_before as f64
}

fn column_loss(before: &[Value], after: &[Value]) -> f64 {
    if is_numeric_column(before) && is_numeric_column(after) {
        let range_before = numeric_range(before).map(|(lo, hi)| hi - lo);
        let range_after = numeric_range(after).map(|(lo, hi)| hi - lo);
        if let (Some(range_before), Some(range_after)) = (range_before, range_after) {
            if range_before != 0.0 && range_before.is_finite() {
                return 1.0 - range_after / range_before;
            }
        }
    }
    distinct_ratio_loss(before, after)
}

/// Mean per-column loss as a percentage
///
/// Numeric columns compare value ranges; everything else, including numeric
/// columns that became text or had no spread, compares distinct counts.
/// Columns absent from either table are skipped and do not count toward the
/// mean. The result is negative when noise widens a range.
pub fn information_loss(original: &Table, transformed: &Table, columns: &[String]) -> f64 {
    let losses: Vec<f64> = columns
        .iter()
        .filter_map(|name| Some(column_loss(original.column(name)?, transformed.column(name)?)))
        .collect();
    if losses.is_empty() {
        return 0.0;
    }
    losses.iter().sum::<f64>() / losses.len() as f64 * 100.0
}

/// Privacy and utility summary for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Achieved k
    #[serde(rename = "k_anonymity")]
    pub achieved_k: usize,
    /// Achieved l over the first sensitive column
    #[serde(rename = "l_diversity")]
    pub achieved_l: f64,
    /// Information loss, rounded to two decimals
    pub information_loss_percentage: f64,
    /// Rows before anonymization
    pub original_rows: usize,
    /// Rows after anonymization
    pub anonymized_rows: usize,
    /// Columns before anonymization
    pub original_columns: usize,
    /// Columns after anonymization
    pub anonymized_columns: usize,
    /// Quasi-identifiers used for grouping
    pub quasi_identifiers: Vec<String>,
    /// Sensitive columns
    pub sensitive_attributes: Vec<String>,
}

impl Metrics {
    /// Measures `transformed` against `original`
    ///
    /// Information loss covers every column of the original table; dropped
    /// identifier columns are skipped.
    pub fn compute(original: &Table, transformed: &Table, roles: &RoleAssignment) -> Result<Self> {
        let achieved_k = k_anonymity(transformed, &roles.quasi_identifiers)?;
        let achieved_l = l_diversity(
            transformed,
            &roles.quasi_identifiers,
            roles.sensitive.first().map(String::as_str),
        )?;
        let loss = information_loss(original, transformed, &original.column_names());

        Ok(Self {
            achieved_k,
            achieved_l,
            information_loss_percentage: (loss * 100.0).round() / 100.0,
            original_rows: original.len(),
            anonymized_rows: transformed.len(),
            original_columns: original.column_count(),
            anonymized_columns: transformed.column_count(),
            quasi_identifiers: roles.quasi_identifiers.clone(),
            sensitive_attributes: roles.sensitive.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ShroudError};

    fn qi(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn patients() -> Table {
        Table::new(vec![
            Column::new(
                "age",
                vec![
                    Value::text("20-30"),
                    Value::text("20-30"),
                    Value::text("30-40"),
                    Value::text("30-40"),
                    Value::text("30-40"),
                ],
            ),
            Column::new(
                "disease",
                vec![
                    Value::text("Flu"),
                    Value::text("Asthma"),
                    Value::text("Flu"),
                    Value::text("Flu"),
                    Value::text("Flu"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_k_anonymity_min_group() {
        assert_eq!(k_anonymity(&patients(), &qi(&["age"])).unwrap(), 2);
        assert_eq!(k_anonymity(&patients(), &[]).unwrap(), 5);
    }

    #[test]
    fn test_k_anonymity_missing_column() {
        assert!(matches!(
            k_anonymity(&patients(), &qi(&["zip"])),
            Err(ShroudError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_k_anonymity_empty_table() {
        let table = Table::new(vec![Column::new("age", vec![])]).unwrap();
        assert_eq!(k_anonymity(&table, &qi(&["age"])).unwrap(), 0);
    }

    #[test]
    fn test_l_diversity() {
        let table = patients();
        assert_eq!(l_diversity(&table, &qi(&["age"]), Some("disease")).unwrap(), 1.0);
        assert_eq!(l_diversity(&table, &[], Some("disease")).unwrap(), 0.0);
        assert_eq!(l_diversity(&table, &qi(&["age"]), None).unwrap(), 0.0);
    }

    #[test]
    fn test_nulls_form_their_own_group() {
        let table = Table::new(vec![Column::new(
            "city",
            vec![Value::Null, Value::text("Lima"), Value::Null],
        )])
        .unwrap();
        let groups = group_by(&table, &qi(&["city"])).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].rows, vec![0, 2]);
        assert_eq!(groups[0].describe(&qi(&["city"])), "city=null");
    }

    #[test]
    fn test_information_loss_numeric_range() {
        let original = Table::new(vec![Column::new(
            "salary",
            vec![Value::Int(0), Value::Int(100)],
        )])
        .unwrap();
        let transformed = Table::new(vec![Column::new(
            "salary",
            vec![Value::Int(25), Value::Int(75)],
        )])
        .unwrap();
        let loss = information_loss(&original, &transformed, &qi(&["salary"]));
        assert!((loss - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_information_loss_generalized_column_uses_distinct_ratio() {
        let original = Table::new(vec![Column::new(
            "age",
            vec![Value::Int(28), Value::Int(35), Value::Int(42), Value::Int(50)],
        )])
        .unwrap();
        let transformed = Table::new(vec![Column::new(
            "age",
            vec![
                Value::text("28-39"),
                Value::text("28-39"),
                Value::text("39-50"),
                Value::text("39-50"),
            ],
        )])
        .unwrap();
        let loss = information_loss(&original, &transformed, &qi(&["age"]));
        assert!((loss - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_information_loss_skips_absent_columns() {
        let original = patients();
        let mut transformed = patients();
        transformed.drop_column("disease");
        let loss = information_loss(&original, &transformed, &qi(&["age", "disease", "zip"]));
        assert_eq!(loss, 0.0);
        assert_eq!(information_loss(&original, &transformed, &[]), 0.0);
    }

    #[test]
    fn test_metrics_compute() {
        let roles = RoleAssignment {
            quasi_identifiers: qi(&["age"]),
            sensitive: qi(&["disease"]),
            ..Default::default()
        };
        let metrics = Metrics::compute(&patients(), &patients(), &roles).unwrap();
        assert_eq!(metrics.achieved_k, 2);
        assert_eq!(metrics.achieved_l, 1.0);
        assert_eq!(metrics.information_loss_percentage, 0.0);
        assert_eq!(metrics.original_rows, 5);
        assert_eq!(metrics.anonymized_columns, 2);

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["k_anonymity"], 2);
        assert_eq!(json["sensitive_attributes"][0], "disease");
    }
}
