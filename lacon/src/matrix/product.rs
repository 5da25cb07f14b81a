//! Right-multiplication `A := A * B`
//!
//! Two kernels exist. The generic one accepts any matrix-like `B` and
//! builds each output row (CSR) or column (CSC) in a dense scratch buffer.
//! The sparse kernel multiplies two matrices of the same layout with a
//! reusable scratch accumulator plus a list of touched positions. Both
//! keep only entries that differ from zero under the default tolerance and
//! swap the new storage in once the product is complete.

use lacon_core::float_cmp;
use lacon_core::validation::nonzero_size;
use lacon_core::{LaError, MatrixLike, Result, Scalar};
use tracing::debug;

use super::layout::{Layout, SparseFormat};
use super::sparse::{CompressedStorage, SparseMatrix};

/// Dense accumulator over one output major index
struct Accumulator<S> {
    values: Vec<S>,
    seen: Vec<bool>,
    touched: Vec<usize>,
}

impl<S: Scalar> Accumulator<S> {
    fn new(len: usize) -> Self {
        Self {
            values: vec![S::zero(); len],
            seen: vec![false; len],
            touched: Vec::new(),
        }
    }

    fn add(&mut self, index: usize, value: S) {
        if !self.seen[index] {
            self.seen[index] = true;
            self.touched.push(index);
        }
        self.values[index] += value;
    }

    /// Move the nonzero accumulated values into `out` in ascending order and reset
    fn drain_into(&mut self, out: &mut CompressedStorage<S>) {
        self.touched.sort_unstable();
        for &index in &self.touched {
            let value = self.values[index];
            if float_cmp::is_nonzero_default(value) {
                out.indices.push(index);
                out.entries.push(value);
            }
            self.values[index] = S::zero();
            self.seen[index] = false;
        }
        self.touched.clear();
        out.pointers.push(out.indices.len());
    }
}

fn start_storage<S>(major_len: usize, capacity: usize) -> CompressedStorage<S> {
    let mut pointers = Vec::with_capacity(major_len + 1);
    pointers.push(0);
    CompressedStorage {
        entries: Vec::with_capacity(capacity),
        pointers,
        indices: Vec::with_capacity(capacity),
    }
}

/// `sum_l outer[m, l] * inner[l, :]` for every major index `m` of `outer`
fn multiply_compressed<S: Scalar>(
    outer: &CompressedStorage<S>,
    inner: &CompressedStorage<S>,
    minor_len: usize,
) -> CompressedStorage<S> {
    let major_len = outer.major_len();
    let mut out = start_storage(major_len, outer.entries.len().max(inner.entries.len()));
    let mut accumulator = Accumulator::new(minor_len);
    for major in 0..major_len {
        for l in outer.range(major) {
            let middle = outer.indices[l];
            let scale = outer.entries[l];
            for k in inner.range(middle) {
                accumulator.add(inner.indices[k], scale * inner.entries[k]);
            }
        }
        accumulator.drain_into(&mut out);
    }
    out
}

impl<S: Scalar, L: Layout> SparseMatrix<S, L> {
    /// `self = self * other` for any matrix-like `other`
    ///
    /// Fails with `ShapeMismatch` unless `other` has `self.cols()` rows.
    /// The result has `other.ncols()` columns.
    pub fn rightmultiply<M: MatrixLike<S> + ?Sized>(&mut self, other: &M) -> Result<()> {
        other.check_shape()?;
        self.check_right_operand(other.nrows())?;
        let out_cols = nonzero_size(other.ncols(), "number of columns")?;
        let storage = self.storage.as_ref();

        let product = match L::FORMAT {
            SparseFormat::Csr => {
                let mut out = start_storage(self.rows, storage.entries.len());
                let mut accumulator = Accumulator::new(out_cols);
                for row in 0..self.rows {
                    for k in storage.range(row) {
                        let middle = storage.indices[k];
                        let value = storage.entries[k];
                        for col in 0..out_cols {
                            accumulator.add(col, value * other.entry_at(middle, col));
                        }
                    }
                    accumulator.drain_into(&mut out);
                }
                out
            }
            SparseFormat::Csc => {
                let mut out = start_storage(out_cols, storage.entries.len());
                let mut accumulator = Accumulator::new(self.rows);
                for col in 0..out_cols {
                    for middle in 0..self.cols {
                        let factor = other.entry_at(middle, col);
                        if factor == S::zero() {
                            continue;
                        }
                        for k in storage.range(middle) {
                            accumulator.add(storage.indices[k], storage.entries[k] * factor);
                        }
                    }
                    accumulator.drain_into(&mut out);
                }
                out
            }
        };

        self.finish_product(product, out_cols);
        Ok(())
    }

    /// `self = self * other` for a sparse `other` of the same layout
    pub fn rightmultiply_sparse(&mut self, other: &Self) -> Result<()> {
        self.check_right_operand(other.rows)?;
        let product = match L::FORMAT {
            SparseFormat::Csr => {
                multiply_compressed(self.storage.as_ref(), other.storage.as_ref(), other.cols)
            }
            SparseFormat::Csc => {
                multiply_compressed(other.storage.as_ref(), self.storage.as_ref(), self.rows)
            }
        };
        self.finish_product(product, other.cols);
        Ok(())
    }

    fn check_right_operand(&self, other_rows: usize) -> Result<()> {
        if other_rows != self.cols {
            return Err(LaError::shape_mismatch(format!(
                "cannot multiply {}x{} by a matrix with {other_rows} rows",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    fn finish_product(&mut self, product: CompressedStorage<S>, cols: usize) {
        debug!(
            format = ?L::FORMAT,
            rows = self.rows,
            cols,
            stored = product.entries.len(),
            "replacing storage with product"
        );
        self.replace_storage(product, cols);
    }
}
