//! In-memory tabular dataset
//!
//! A [`Table`] is an ordered list of named columns of equal length. Rows are
//! positional: transforms replace cell values in place and never reorder or
//! delete rows. On the wire a table is an array of row objects whose keys
//! follow column order.

use crate::domain::errors::ShroudError;
use crate::domain::result::Result;
use crate::domain::value::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};

/// A named column of cell values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Cell values in row order
    pub values: Vec<Value>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered columns of equal length
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table from columns
    ///
    /// # Errors
    ///
    /// Returns [`ShroudError::MalformedData`] if column lengths differ or a
    /// column name repeats.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.values.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.values.len() != row_count {
                return Err(ShroudError::MalformedData(format!(
                    "Column '{}' has {} values, expected {}",
                    column.name,
                    column.values.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ShroudError::MalformedData(format!(
                    "Duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a table from row mappings; missing cells become `Null`
    pub fn from_rows(column_names: &[String], rows: &[HashMap<String, Value>]) -> Result<Self> {
        let columns = column_names
            .iter()
            .map(|name| {
                let values = rows
                    .iter()
                    .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
                    .collect();
                Column::new(name.clone(), values)
            })
            .collect();
        let mut table = Self::new(columns)?;
        table.row_count = rows.len();
        Ok(table)
    }

    /// Builds a table from JSON records
    ///
    /// Column order is the first-seen key order across all records.
    pub fn from_records(records: Vec<serde_json::Map<String, serde_json::Value>>) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for key in record.keys() {
                if !index.contains_key(key) {
                    index.insert(key.clone(), names.len());
                    names.push(key.clone());
                }
            }
        }

        let mut values: Vec<Vec<Value>> = vec![Vec::with_capacity(records.len()); names.len()];
        for (row, record) in records.into_iter().enumerate() {
            for (key, cell) in record {
                let position = index[&key];
                let cell = Value::try_from(cell).map_err(|e| {
                    ShroudError::MalformedData(format!("Row {row}, column '{key}': {e}"))
                })?;
                values[position].push(cell);
            }
            for column in values.iter_mut() {
                if column.len() < row + 1 {
                    column.push(Value::Null);
                }
            }
        }

        let row_count = values.first().map(Vec::len).unwrap_or(0);
        let columns = names
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        let mut table = Self::new(columns)?;
        table.row_count = row_count;
        Ok(table)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns true if the column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Borrow a column's values
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Borrow a column's values or fail with [`ShroudError::ColumnNotFound`]
    pub fn require_column(&self, name: &str) -> Result<&[Value]> {
        self.column(name)
            .ok_or_else(|| ShroudError::ColumnNotFound(name.to_string()))
    }

    /// Replaces a column's values in place, keeping its position
    pub fn replace_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.row_count {
            return Err(ShroudError::MalformedData(format!(
                "Replacement for column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.row_count
            )));
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ShroudError::ColumnNotFound(name.to_string()))?;
        column.values = values;
        Ok(())
    }

    /// Removes a column, returning it if it existed
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let position = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(position))
    }

    /// Value at a row position
    pub fn cell(&self, column: &str, row: usize) -> Option<&Value> {
        self.column(column).and_then(|values| values.get(row))
    }

    /// Iterates rows as `(column, value)` pairs in column order
    pub fn rows(&self) -> impl Iterator<Item = Vec<(&str, &Value)>> + '_ {
        (0..self.row_count).map(move |row| {
            self.columns
                .iter()
                .map(|c| (c.name.as_str(), &c.values[row]))
                .collect()
        })
    }
}

/// Returns true when the column is numeric
///
/// A column is numeric when it holds at least one number and every non-null
/// cell is a number.
pub fn is_numeric_column(values: &[Value]) -> bool {
    let mut any_number = false;
    for value in values {
        match value {
            Value::Null => {}
            Value::Int(_) | Value::Float(_) => any_number = true,
            _ => return false,
        }
    }
    any_number
}

/// Number of distinct values in a column, nulls included
pub fn distinct_count(values: &[Value]) -> usize {
    values.iter().collect::<HashSet<_>>().len()
}

/// `(min, max)` over the numeric cells of a column
pub fn numeric_range(values: &[Value]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter_map(Value::as_f64)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

struct RowView<'a> {
    table: &'a Table,
    row: usize,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len()))?;
        for column in &self.table.columns {
            map.serialize_entry(&column.name, &column.values[self.row])?;
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.row_count))?;
        for row in 0..self.row_count {
            seq.serialize_element(&RowView { table: self, row })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let records = Vec::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
        Table::from_records(records).map_err(serde::de::Error::custom)
    }
}
