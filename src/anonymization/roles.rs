//! Column role resolution

use crate::anonymization::config::{ColumnMapping, ColumnRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Columns partitioned by declared role
///
/// The three role lists are disjoint and keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Directly identifying columns
    pub identifiers: Vec<String>,
    /// Quasi-identifying columns
    pub quasi_identifiers: Vec<String>,
    /// Sensitive columns
    pub sensitive: Vec<String>,
    /// Declared columns that do not exist in the table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_columns: Vec<String>,
    /// Unknown columns whose last declaration is sensitive
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_sensitive: Vec<String>,
}

impl RoleAssignment {
    /// Role of a column; unmapped columns are [`ColumnRole::None`]
    pub fn role_of(&self, column: &str) -> ColumnRole {
        let contains = |list: &[String]| list.iter().any(|c| c == column);
        if contains(&self.identifiers) {
            ColumnRole::Identifier
        } else if contains(&self.quasi_identifiers) {
            ColumnRole::QuasiIdentifier
        } else if contains(&self.sensitive) {
            ColumnRole::Sensitive
        } else {
            ColumnRole::None
        }
    }

    /// True when at least one quasi-identifier is declared
    pub fn has_quasi_identifiers(&self) -> bool {
        !self.quasi_identifiers.is_empty()
    }

    /// Sensitive columns the l-diversity pass reports on, present ones first
    pub fn diversity_targets(&self) -> impl Iterator<Item = &String> {
        self.sensitive.iter().chain(&self.unresolved_sensitive)
    }
}

/// Partitions `mappings` over the columns that exist in the table
///
/// Mappings for unknown columns are ignored and listed in
/// [`RoleAssignment::unknown_columns`]; those declared sensitive are also kept
/// in [`RoleAssignment::unresolved_sensitive`]. When a column is declared more than
/// once the last declaration wins, placed at the position of its first.
pub fn resolve_roles(mappings: &[ColumnMapping], table_columns: &[String]) -> RoleAssignment {
    let mut order: Vec<&str> = Vec::new();
    let mut roles: HashMap<&str, ColumnRole> = HashMap::new();
    let mut unknown_roles: HashMap<&str, ColumnRole> = HashMap::new();
    let mut assignment = RoleAssignment::default();

    for mapping in mappings {
        let column = mapping.column.as_str();
        if !table_columns.iter().any(|c| c == column) {
            if unknown_roles.insert(column, mapping.role).is_none() {
                assignment.unknown_columns.push(column.to_string());
            }
            continue;
        }
        if roles.insert(column, mapping.role).is_none() {
            order.push(column);
        }
    }

    for column in order {
        let target = match roles[column] {
            ColumnRole::Identifier => &mut assignment.identifiers,
            ColumnRole::QuasiIdentifier => &mut assignment.quasi_identifiers,
            ColumnRole::Sensitive => &mut assignment.sensitive,
            ColumnRole::None => continue,
        };
        target.push(column.to_string());
    }

    assignment.unresolved_sensitive = assignment
        .unknown_columns
        .iter()
        .filter(|column| unknown_roles.get(column.as_str()) == Some(&ColumnRole::Sensitive))
        .cloned()
        .collect();

    assignment
}
