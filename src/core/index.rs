use crate::core::error::{Error, Result};

/// Row labels of a dataset.
///
/// Labels are carried through every transform unchanged and are what a
/// compiled function receives as its `index` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    labels: Vec<i64>,
    name: Option<String>,
}

impl Index {
    /// Creates a range index `0..len`
    pub fn range(len: usize) -> Self {
        Self {
            labels: (0..len as i64).collect(),
            name: None,
        }
    }

    /// Creates an index from explicit labels
    pub fn from_labels(labels: Vec<i64>) -> Self {
        Self { labels, name: None }
    }

    /// Sets the index name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Gets the label at a position
    pub fn get(&self, position: usize) -> Result<i64> {
        self.labels
            .get(position)
            .copied()
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "index position {} out of bounds for length {}",
                    position,
                    self.labels.len()
                ))
            })
    }

    /// Gathers the labels at the given positions, in that order
    pub fn take(&self, positions: &[usize]) -> Vec<i64> {
        positions.iter().map(|&p| self.labels[p]).collect()
    }
}
