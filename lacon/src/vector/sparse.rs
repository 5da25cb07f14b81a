//! Copy-on-write sparse vector
//!
//! Stored indices are kept sorted and unique; lookups use binary search.
//! Unlike a sparse matrix the structure is open: writing to an unstored
//! index inserts it.

use std::sync::Arc;

use lacon_core::float_cmp;
use lacon_core::validation::{check_index, check_len, nonzero_size};
use lacon_core::{Backend, Container, LaError, Result, Scalar, Vector, VectorLike};
use tracing::debug;

use super::DenseVector;

#[derive(Debug, Clone, PartialEq)]
struct SparseEntries<S> {
    indices: Vec<usize>,
    values: Vec<S>,
}

/// Fixed-size vector storing only selected entries
#[derive(Debug, Clone)]
pub struct SparseVector<S> {
    size: usize,
    entries: Arc<SparseEntries<S>>,
}

impl<S: Scalar> SparseVector<S> {
    /// Vector of `size` without stored entries; a zero size is rejected
    pub fn new(size: usize) -> Result<Self> {
        nonzero_size(size, "vector size")?;
        Ok(Self {
            size,
            entries: Arc::new(SparseEntries {
                indices: Vec::new(),
                values: Vec::new(),
            }),
        })
    }

    /// Build from `(index, value)` pairs in any order
    ///
    /// Indices must be unique and below `size`.
    pub fn from_entries(size: usize, pairs: impl IntoIterator<Item = (usize, S)>) -> Result<Self> {
        let mut vector = Self::new(size)?;
        let mut pairs: Vec<(usize, S)> = pairs.into_iter().collect();
        pairs.sort_unstable_by_key(|&(index, _)| index);
        if let Some(pair) = pairs.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(LaError::wrong_input(format!(
                "index {} given twice",
                pair[0].0
            )));
        }
        if let Some(&(last, _)) = pairs.last() {
            check_index(last, size, "index")?;
        }
        let (indices, values): (Vec<usize>, Vec<S>) = pairs.into_iter().unzip();
        vector.entries = Arc::new(SparseEntries { indices, values });
        Ok(vector)
    }

    /// Store the entries of `values` that differ from zero under `epsilon`
    pub fn from_dense(values: &[S], epsilon: f64) -> Result<Self> {
        Self::from_entries(
            values.len(),
            values
                .iter()
                .copied()
                .enumerate()
                .filter(|&(_, value)| float_cmp::is_nonzero(value, epsilon)),
        )
    }

    pub fn nonzero_indices(&self) -> &[usize] {
        &self.entries.indices
    }

    pub fn values(&self) -> &[S] {
        &self.entries.values
    }

    pub fn num_stored(&self) -> usize {
        self.entries.indices.len()
    }

    /// Append an entry behind every stored index
    ///
    /// Fails with `WrongInputGiven` if `index` does not exceed the last
    /// stored index.
    pub fn set_new_entry(&mut self, index: usize, value: S) -> Result<()> {
        check_index(index, self.size, "index")?;
        if let Some(&last) = self.entries.indices.last() {
            if index <= last {
                return Err(LaError::wrong_input(format!(
                    "new index {index} must exceed the last stored index {last}"
                )));
            }
        }
        let storage = self.storage_mut();
        storage.indices.push(index);
        storage.values.push(value);
        Ok(())
    }

    /// Drop every stored entry
    pub fn clear(&mut self) {
        let storage = self.storage_mut();
        storage.indices.clear();
        storage.values.clear();
    }

    pub fn to_dense(&self) -> DenseVector<S> {
        let mut values = vec![S::zero(); self.size];
        for (index, value) in self.stored_entries() {
            values[index] = value;
        }
        DenseVector::from_nonempty(values)
    }

    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.entries) > 1
    }

    fn position(&self, index: usize) -> std::result::Result<usize, usize> {
        self.entries.indices.binary_search(&index)
    }

    fn storage_mut(&mut self) -> &mut SparseEntries<S> {
        if self.is_shared() {
            debug!(
                size = self.size,
                stored = self.entries.indices.len(),
                "cloning shared sparse vector"
            );
        }
        Arc::make_mut(&mut self.entries)
    }

    fn update(&mut self, index: usize, value: S, accumulate: bool) -> Result<()> {
        check_index(index, self.size, "index")?;
        let position = self.position(index);
        let storage = self.storage_mut();
        match position {
            Ok(position) if accumulate => storage.values[position] += value,
            Ok(position) => storage.values[position] = value,
            Err(position) => {
                storage.indices.insert(position, index);
                storage.values.insert(position, value);
            }
        }
        Ok(())
    }
}

impl<S: Scalar> Container for SparseVector<S> {
    type Element = S;
    const BACKEND: Backend = Backend::CommonSparse;

    fn copy(&self) -> Self {
        Self {
            size: self.size,
            entries: Arc::new(self.entries.as_ref().clone()),
        }
    }

    fn scal(&mut self, alpha: S) {
        for value in self.storage_mut().values.iter_mut() {
            *value *= alpha;
        }
    }

    fn axpy(&mut self, alpha: S, x: &Self) -> Result<()> {
        check_len(x.size, self.size, "axpy operand")?;
        let lhs = Arc::clone(&self.entries);
        let rhs = Arc::clone(&x.entries);
        let mut indices = Vec::with_capacity(lhs.indices.len() + rhs.indices.len());
        let mut values = Vec::with_capacity(indices.capacity());
        let (mut i, mut j) = (0, 0);
        while i < lhs.indices.len() || j < rhs.indices.len() {
            let left = lhs.indices.get(i).copied().unwrap_or(usize::MAX);
            let right = rhs.indices.get(j).copied().unwrap_or(usize::MAX);
            if left < right {
                indices.push(left);
                values.push(lhs.values[i]);
                i += 1;
            } else if right < left {
                indices.push(right);
                values.push(alpha * rhs.values[j]);
                j += 1;
            } else {
                indices.push(left);
                values.push(lhs.values[i] + alpha * rhs.values[j]);
                i += 1;
                j += 1;
            }
        }
        self.entries = Arc::new(SparseEntries { indices, values });
        Ok(())
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        self.size == other.size
    }
}

impl<S: Scalar> Vector for SparseVector<S> {
    fn size(&self) -> usize {
        self.size
    }

    fn get_entry(&self, index: usize) -> Result<S> {
        check_index(index, self.size, "index")?;
        Ok(self
            .position(index)
            .map_or(S::zero(), |position| self.entries.values[position]))
    }

    fn set_entry(&mut self, index: usize, value: S) -> Result<()> {
        self.update(index, value, false)
    }

    fn add_to_entry(&mut self, index: usize, value: S) -> Result<()> {
        self.update(index, value, true)
    }

    fn stored_entries(&self) -> impl Iterator<Item = (usize, S)> + '_ {
        self.entries
            .indices
            .iter()
            .copied()
            .zip(self.entries.values.iter().copied())
    }
}

impl<S: Scalar> VectorLike<S> for SparseVector<S> {
    fn dim(&self) -> usize {
        self.size
    }

    fn entry(&self, index: usize) -> S {
        self.position(index)
            .map_or(S::zero(), |position| self.entries.values[position])
    }
}

impl<S: Scalar> PartialEq for SparseVector<S> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.entries == other.entries
    }
}
