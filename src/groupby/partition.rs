//! Row-to-group partitioning and per-group slices.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::core::column::Column;
use crate::core::error::{Error, Result};
use crate::core::index::Index;

/// One component of a group key
#[derive(Debug, Clone)]
pub enum KeyPart {
    Int(i64),
    Float(f64),
    Str(String),
}

impl KeyPart {
    fn rank(&self) -> u8 {
        match self {
            KeyPart::Int(_) => 0,
            KeyPart::Float(_) => 1,
            KeyPart::Str(_) => 2,
        }
    }

    fn from_column(column: &Column, row: usize) -> Self {
        match column {
            Column::Int64(v) => KeyPart::Int(v[row]),
            Column::Float64(v) => KeyPart::Float(v[row]),
            Column::String(v) => KeyPart::Str(v[row].clone()),
        }
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Int(a), KeyPart::Int(b)) => a.cmp(b),
            (KeyPart::Float(a), KeyPart::Float(b)) => a.total_cmp(b),
            (KeyPart::Str(a), KeyPart::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            KeyPart::Int(v) => v.hash(state),
            // total_cmp equality is bitwise equality
            KeyPart::Float(v) => v.to_bits().hash(state),
            KeyPart::Str(v) => v.hash(state),
        }
    }
}

impl std::fmt::Display for KeyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Int(v) => write!(f, "{}", v),
            KeyPart::Float(v) => write!(f, "{}", v),
            KeyPart::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Key identifying one group; one part per grouping column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(pub Vec<KeyPart>);

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.len() == 1 {
            return write!(f, "{}", self.0[0]);
        }
        write!(f, "(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, ")")
    }
}

/// A group: its key and the positions of its rows, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    key: GroupKey,
    rows: Vec<usize>,
}

impl Group {
    pub fn new(key: GroupKey, rows: Vec<usize>) -> Self {
        Self { key, rows }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// Row positions belonging to this group
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Values and row labels gathered for one group.
///
/// `values`, `index` and `positions` always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSlice {
    pub key: GroupKey,
    /// Row positions in the source dataset
    pub positions: Vec<usize>,
    pub values: Vec<f64>,
    /// Original row labels
    pub index: Vec<i64>,
}

impl GroupSlice {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of groups covering every row exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPartition {
    groups: Vec<Group>,
    row_count: usize,
}

impl GroupPartition {
    /// Partition rows by the values of `columns`.
    ///
    /// Groups come out in sorted key order when `sort` is set and in order of
    /// first appearance otherwise.
    pub fn from_key_columns(columns: &[&Column], row_count: usize, sort: bool) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::InvalidInput(
                "at least one grouping column is required".to_string(),
            ));
        }
        for column in columns {
            if column.len() != row_count {
                return Err(Error::LengthMismatch {
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }

        let mut positions: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for row in 0..row_count {
            let key = GroupKey(
                columns
                    .iter()
                    .map(|c| KeyPart::from_column(c, row))
                    .collect(),
            );
            match positions.get(&key) {
                Some(&g) => groups[g].rows.push(row),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push(Group::new(key, vec![row]));
                }
            }
        }

        if sort {
            groups.sort_by(|a, b| a.key.cmp(&b.key));
        }

        Ok(Self { groups, row_count })
    }

    /// Adopt groups discovered elsewhere, checking that they partition `0..row_count`
    pub fn from_groups(groups: Vec<Group>, row_count: usize) -> Result<Self> {
        let mut seen = vec![false; row_count];
        for group in &groups {
            for &row in group.rows() {
                match seen.get_mut(row) {
                    None => {
                        return Err(Error::Consistency(format!(
                            "group {} refers to row {} of {}",
                            group.key, row, row_count
                        )))
                    }
                    Some(true) => {
                        return Err(Error::Consistency(format!(
                            "row {} belongs to more than one group",
                            row
                        )))
                    }
                    Some(slot) => *slot = true,
                }
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(Error::Consistency(format!(
                "row {} does not belong to any group",
                missing
            )));
        }

        Ok(Self { groups, row_count })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of rows covered by the partition
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Gather `values` and `index` for group number `group`
    pub fn slice(&self, group: usize, values: &[f64], index: &Index) -> Result<GroupSlice> {
        let g = self.groups.get(group).ok_or_else(|| {
            Error::InvalidInput(format!(
                "group {} out of range for {} groups",
                group,
                self.groups.len()
            ))
        })?;
        self.check_lengths(values, index)?;

        Ok(GroupSlice {
            key: g.key.clone(),
            positions: g.rows.clone(),
            values: g.rows.iter().map(|&r| values[r]).collect(),
            index: index.take(&g.rows),
        })
    }

    /// Slices for every group, in group order
    pub fn slices(&self, values: &[f64], index: &Index) -> Result<Vec<GroupSlice>> {
        (0..self.groups.len())
            .map(|g| self.slice(g, values, index))
            .collect()
    }

    fn check_lengths(&self, values: &[f64], index: &Index) -> Result<()> {
        if values.len() != self.row_count {
            return Err(Error::LengthMismatch {
                expected: self.row_count,
                actual: values.len(),
            });
        }
        if index.len() != self.row_count {
            return Err(Error::LengthMismatch {
                expected: self.row_count,
                actual: index.len(),
            });
        }
        Ok(())
    }
}
