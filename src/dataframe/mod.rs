//! Column-oriented dataset the grouping layer operates on.

use std::collections::HashMap;

use crate::core::column::Column;
use crate::core::error::{Error, Result};
use crate::core::index::Index;
use crate::series::Series;

/// A set of equally long named columns sharing one row index
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
    column_indices: HashMap<String, usize>,
    column_names: Vec<String>,
    row_count: usize,
    index: Option<Index>,
}

impl Default for DataFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFrame {
    /// Create a new empty DataFrame
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            column_indices: HashMap::new(),
            column_names: Vec::new(),
            row_count: 0,
            index: None,
        }
    }

    /// Create an empty DataFrame whose rows are labelled by `index`
    pub fn with_index(index: Index) -> Self {
        Self {
            row_count: index.len(),
            index: Some(index),
            ..Self::new()
        }
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get column count
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get list of column names
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Check if specified column exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    /// Row labels; a range index unless one was supplied
    pub fn index(&self) -> Index {
        self.index
            .clone()
            .unwrap_or_else(|| Index::range(self.row_count))
    }

    /// Add a column
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();

        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }

        let column_len = column.len();
        let fixed_len = !self.columns.is_empty() || self.index.is_some();
        if fixed_len && column_len != self.row_count {
            return Err(Error::LengthMismatch {
                expected: self.row_count,
                actual: column_len,
            });
        }

        let column_idx = self.columns.len();
        self.columns.push(column);
        self.column_indices.insert(name.clone(), column_idx);
        self.column_names.push(name);
        self.row_count = column_len;

        Ok(())
    }

    /// Add a float column
    pub fn add_float_column(&mut self, name: impl Into<String>, data: Vec<f64>) -> Result<()> {
        self.add_column(name, Column::Float64(data))
    }

    /// Add an integer column
    pub fn add_int_column(&mut self, name: impl Into<String>, data: Vec<i64>) -> Result<()> {
        self.add_column(name, Column::Int64(data))
    }

    /// Add a string column
    pub fn add_string_column(&mut self, name: impl Into<String>, data: Vec<String>) -> Result<()> {
        self.add_column(name, Column::String(data))
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_indices
            .get(name)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Float view of a numeric column
    pub fn get_float_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?.to_f64(name)
    }

    /// Extract one numeric column as a series sharing this frame's index
    pub fn series(&self, name: &str) -> Result<Series> {
        let values = self.get_float_column(name)?;
        Series::new(values, self.index(), Some(name.to_string()))
    }

    /// Iterate `(name, column)` pairs in insertion order
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }
}
