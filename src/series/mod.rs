use crate::core::error::{Error, Result};
use crate::core::index::Index;

/// A named float column with its row labels
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    index: Index,
    name: Option<String>,
}

impl Series {
    /// Create a new series; `values` and `index` must be the same length
    pub fn new(values: Vec<f64>, index: Index, name: Option<String>) -> Result<Self> {
        if values.len() != index.len() {
            return Err(Error::LengthMismatch {
                expected: index.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            index,
            name,
        })
    }

    /// Create a series labelled by a range index
    pub fn from_vec(values: Vec<f64>, name: Option<String>) -> Self {
        let index = Index::range(values.len());
        Self {
            values,
            index,
            name,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}
