//! Copy-on-write dense vector

use std::sync::Arc;

use lacon_core::validation::{check_index, check_len, nonzero_size};
use lacon_core::{Backend, Container, Result, Scalar, Vector, VectorLike};
use tracing::debug;

/// Fixed-size dense vector sharing its storage until written
#[derive(Debug, Clone)]
pub struct DenseVector<S> {
    values: Arc<Vec<S>>,
}

impl<S: Scalar> DenseVector<S> {
    /// `size` copies of `value`; a zero size is rejected
    pub fn new(size: usize, value: S) -> Result<Self> {
        nonzero_size(size, "vector size")?;
        Ok(Self {
            values: Arc::new(vec![value; size]),
        })
    }

    pub fn zeros(size: usize) -> Result<Self> {
        Self::new(size, S::zero())
    }

    /// Take ownership of `values`; an empty vector is rejected
    pub fn from_vec(values: Vec<S>) -> Result<Self> {
        nonzero_size(values.len(), "vector size")?;
        Ok(Self {
            values: Arc::new(values),
        })
    }

    pub(crate) fn from_nonempty(values: Vec<S>) -> Self {
        debug_assert!(!values.is_empty());
        Self {
            values: Arc::new(values),
        }
    }

    pub fn as_slice(&self) -> &[S] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<S> {
        self.values.as_ref().clone()
    }

    /// True while the storage is shared with another handle
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.values) > 1
    }

    fn values_mut(&mut self) -> &mut Vec<S> {
        if self.is_shared() {
            debug!(size = self.values.len(), "cloning shared dense vector");
        }
        Arc::make_mut(&mut self.values)
    }
}

impl<S: Scalar> Container for DenseVector<S> {
    type Element = S;
    const BACKEND: Backend = Backend::CommonDense;

    fn copy(&self) -> Self {
        Self {
            values: Arc::new(self.to_vec()),
        }
    }

    fn scal(&mut self, alpha: S) {
        for value in self.values_mut().iter_mut() {
            *value *= alpha;
        }
    }

    fn axpy(&mut self, alpha: S, x: &Self) -> Result<()> {
        check_len(x.size(), self.size(), "axpy operand")?;
        let x = Arc::clone(&x.values);
        for (y, x) in self.values_mut().iter_mut().zip(x.iter()) {
            *y += alpha * *x;
        }
        Ok(())
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        self.size() == other.size()
    }
}

impl<S: Scalar> Vector for DenseVector<S> {
    fn size(&self) -> usize {
        self.values.len()
    }

    fn get_entry(&self, index: usize) -> Result<S> {
        check_index(index, self.size(), "index")?;
        Ok(self.values[index])
    }

    fn set_entry(&mut self, index: usize, value: S) -> Result<()> {
        check_index(index, self.size(), "index")?;
        self.values_mut()[index] = value;
        Ok(())
    }

    fn add_to_entry(&mut self, index: usize, value: S) -> Result<()> {
        check_index(index, self.size(), "index")?;
        self.values_mut()[index] += value;
        Ok(())
    }

    fn stored_entries(&self) -> impl Iterator<Item = (usize, S)> + '_ {
        self.values.iter().copied().enumerate()
    }
}

impl<S: Scalar> VectorLike<S> for DenseVector<S> {
    fn dim(&self) -> usize {
        self.values.len()
    }

    fn entry(&self, index: usize) -> S {
        self.values[index]
    }
}

impl<S: Scalar> PartialEq for DenseVector<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
