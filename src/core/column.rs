use crate::core::error::{Error, Result};

/// Enumeration representing column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    String,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::String => write!(f, "string"),
        }
    }
}

/// A single typed column of a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    String(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::String(_) => ColumnType::String,
        }
    }

    /// Whether the column can be fed to a transform function
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Column::String(_))
    }

    /// Numeric view of the column; `Int64` is widened to `f64`
    pub fn to_f64(&self, name: &str) -> Result<Vec<f64>> {
        match self {
            Column::Float64(v) => Ok(v.clone()),
            Column::Int64(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Column::String(_) => Err(Error::ColumnTypeMismatch {
                name: name.to_string(),
                expected: ColumnType::Float64.to_string(),
                found: ColumnType::String.to_string(),
            }),
        }
    }
}
