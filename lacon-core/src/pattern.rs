//! Sparsity patterns
//!
//! A [`SparsityPattern`] lists, for every outer index (a row for CSR), the
//! inner indices that may hold a stored entry. Patterns are assembled with
//! [`SparsityPattern::insert`] in any order and must be sorted before they
//! size a sparse matrix.

use crate::validation::size_from_isize;
use crate::{LaError, Result};

/// Per-row sets of column indices eligible to hold entries
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparsityPattern {
    rows: Vec<Vec<usize>>,
}

impl SparsityPattern {
    /// Create an empty pattern with `size` outer slots
    pub fn new(size: usize) -> Self {
        Self {
            rows: vec![Vec::new(); size],
        }
    }

    /// Create an empty pattern from a signed size
    pub fn try_with_size(size: isize) -> Result<Self> {
        Ok(Self::new(size_from_isize(size)?))
    }

    /// Build a pattern from explicit per-row index lists (not sorted)
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Self {
        Self { rows }
    }

    /// Every column in every row
    pub fn dense(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![(0..cols).collect(); rows],
        }
    }

    /// Only the main diagonal
    pub fn diagonal(size: usize) -> Self {
        Self {
            rows: (0..size).map(|i| vec![i]).collect(),
        }
    }

    /// Number of outer slots
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Append `inner` to the index list of `outer`
    ///
    /// The list is left unsorted; call [`sort`](Self::sort) once assembly
    /// is done.
    pub fn insert(&mut self, outer: usize, inner: usize) -> Result<()> {
        let size = self.rows.len();
        let row = self.rows.get_mut(outer).ok_or_else(|| {
            LaError::index_out_of_range(format!("pattern row {outer} is not below {size}"))
        })?;
        row.push(inner);
        Ok(())
    }

    /// Index list of one outer slot
    pub fn inner(&self, outer: usize) -> Option<&[usize]> {
        self.rows.get(outer).map(Vec::as_slice)
    }

    /// Sort and deduplicate every row
    pub fn sort(&mut self) {
        for row in &mut self.rows {
            row.sort_unstable();
            row.dedup();
        }
    }

    /// Sort and deduplicate a single row
    pub fn sort_row(&mut self, outer: usize) -> Result<()> {
        let size = self.rows.len();
        let row = self.rows.get_mut(outer).ok_or_else(|| {
            LaError::index_out_of_range(format!("pattern row {outer} is not below {size}"))
        })?;
        row.sort_unstable();
        row.dedup();
        Ok(())
    }

    /// True if every row is strictly increasing
    pub fn is_sorted(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.windows(2).all(|pair| pair[0] < pair[1]))
    }

    /// Total number of stored indices over all rows
    pub fn num_entries(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Largest stored inner index, if any
    pub fn max_inner(&self) -> Option<usize> {
        self.rows.iter().filter_map(|row| row.iter().max()).max().copied()
    }

    /// Iterate over the per-row index lists
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Check whether `(outer, inner)` is part of the pattern
    pub fn contains(&self, outer: usize, inner: usize) -> bool {
        self.rows
            .get(outer)
            .is_some_and(|row| row.contains(&inner))
    }
}

/// Patterns compare row by row as index sets, ignoring order and repeats
impl PartialEq for SparsityPattern {
    fn eq(&self, other: &Self) -> bool {
        if self.rows.len() != other.rows.len() {
            return false;
        }
        self.rows.iter().zip(&other.rows).all(|(lhs, rhs)| {
            let mut lhs = lhs.clone();
            let mut rhs = rhs.clone();
            lhs.sort_unstable();
            lhs.dedup();
            rhs.sort_unstable();
            rhs.dedup();
            lhs == rhs
        })
    }
}

impl Eq for SparsityPattern {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_sort() {
        let mut pattern = SparsityPattern::new(2);
        pattern.insert(0, 3).unwrap();
        pattern.insert(0, 1).unwrap();
        pattern.insert(0, 3).unwrap();
        pattern.insert(1, 0).unwrap();
        assert!(!pattern.is_sorted());

        pattern.sort();
        assert!(pattern.is_sorted());
        assert_eq!(pattern.inner(0), Some(&[1, 3][..]));
        assert_eq!(pattern.num_entries(), 3);
        assert_eq!(pattern.max_inner(), Some(3));
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut pattern = SparsityPattern::new(1);
        assert!(matches!(
            pattern.insert(1, 0),
            Err(LaError::IndexOutOfRange(_))
        ));
        assert!(pattern.sort_row(4).is_err());
    }

    #[test]
    fn test_set_equality() {
        let sorted = SparsityPattern::from_rows(vec![vec![0, 2], vec![1]]);
        let shuffled = SparsityPattern::from_rows(vec![vec![2, 0, 2], vec![1]]);
        let other = SparsityPattern::from_rows(vec![vec![0], vec![1]]);
        assert_eq!(sorted, shuffled);
        assert_ne!(sorted, other);
        assert_ne!(sorted, SparsityPattern::new(3));
    }

    #[test]
    fn test_builders() {
        assert_eq!(SparsityPattern::dense(2, 3).num_entries(), 6);
        let diagonal = SparsityPattern::diagonal(3);
        assert!(diagonal.contains(2, 2));
        assert!(!diagonal.contains(2, 1));
        assert!(SparsityPattern::try_with_size(-2).is_err());
        assert_eq!(SparsityPattern::try_with_size(4).unwrap().size(), 4);
    }
}
