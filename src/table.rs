//! Columnar table of time-series data bound to an evaluation context.

use std::collections::HashMap;

use crate::error::{Result, TdxError};

/// A rectangular, column-oriented table of `f64` data.
///
/// Column names are stored upper-cased so lookups are case-insensitive,
/// matching identifier folding in the language. All columns have the same
/// number of rows; missing entries are `NAN`.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: HashMap<String, Vec<f64>>,
    rows: usize,
}

impl DataTable {
    pub fn new() -> Self {
        DataTable::default()
    }

    /// Builds a table from named columns, rejecting ragged input.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = DataTable::new();
        for (name, values) in columns {
            table.insert_column(name, values)?;
        }
        Ok(table)
    }

    /// Adds or replaces a column. The first column fixes the row count;
    /// later columns must match it.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into().to_uppercase();
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(TdxError::Value(format!(
                "Column '{}' has {} rows, expected {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(&name.to_uppercase()).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(&name.to_uppercase())
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.columns.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[test]
fn test_ragged_columns_rejected() {
    let mut table = DataTable::new();
    table.insert_column("close", vec![1.0, 2.0, 3.0]).unwrap();
    let err = table.insert_column("open", vec![1.0]).unwrap_err();
    assert!(matches!(err, TdxError::Value(_)));
}
