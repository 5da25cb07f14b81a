//! Compressed sparse matrices with copy-on-write storage
//!
//! [`SparseMatrix`] keeps its entries, pointers and indices in one shared
//! compressed storage block and its lock buckets in a separate shared
//! [`MutexPool`]. Cloning a matrix shares both; the first mutation of a
//! shared matrix clones the storage and creates a fresh pool.
//!
//! The sparsity pattern is closed: writes only reach coordinates that were
//! part of the pattern at construction.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

use lacon_core::float_cmp;
use lacon_core::traits::container::check_product_dims;
use lacon_core::validation::{check_index, check_len, check_same_shape, nonzero_size};
use lacon_core::{
    Backend, Container, LaError, Matrix, MatrixLike, Result, Scalar, SparsityPattern, VectorLike,
};
use rayon::prelude::*;
use tracing::debug;

use super::dense::DenseMatrix;
use super::layout::{Csc, Csr, Layout, SparseFormat};
use crate::config::SparseMatrixOptions;
use crate::locking::MutexPool;
use crate::vector::SparseVector;

/// Row count from which [`CsrMatrix::par_mv_into`] splits work across threads
pub const PARALLEL_MV_MIN_ROWS: usize = 1024;

/// Entries, major pointers and minor indices of a compressed matrix
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CompressedStorage<S> {
    pub(super) entries: Vec<S>,
    pub(super) pointers: Vec<usize>,
    pub(super) indices: Vec<usize>,
}

impl<S> CompressedStorage<S> {
    pub(super) fn empty(major_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointers: vec![0; major_len + 1],
            indices: Vec::new(),
        }
    }

    pub(super) fn range(&self, major: usize) -> Range<usize> {
        self.pointers[major]..self.pointers[major + 1]
    }

    /// Position of `(major, minor)` in `entries`
    pub(super) fn find(&self, major: usize, minor: usize) -> Option<usize> {
        let range = self.range(major);
        self.indices[range.clone()]
            .binary_search(&minor)
            .ok()
            .map(|offset| range.start + offset)
    }

    pub(super) fn major_len(&self) -> usize {
        self.pointers.len() - 1
    }
}

/// Counting sort of `(major, minor, value)` triplets into compressed form
///
/// Triplets keep their relative order within a major index, so input
/// sorted by minor index yields sorted slices.
pub(super) fn compress<S: Scalar>(
    major_len: usize,
    triplets: &[(usize, usize, S)],
) -> CompressedStorage<S> {
    let mut pointers = vec![0; major_len + 1];
    for &(major, _, _) in triplets {
        pointers[major + 1] += 1;
    }
    for major in 0..major_len {
        pointers[major + 1] += pointers[major];
    }

    let mut next = pointers[..major_len].to_vec();
    let mut indices = vec![0; triplets.len()];
    let mut entries = vec![S::zero(); triplets.len()];
    for &(major, minor, value) in triplets {
        let slot = next[major];
        next[major] += 1;
        indices[slot] = minor;
        entries[slot] = value;
    }

    CompressedStorage {
        entries,
        pointers,
        indices,
    }
}

/// Compressed sparse matrix in CSR or CSC orientation
pub struct SparseMatrix<S, L: Layout> {
    pub(super) rows: usize,
    pub(super) cols: usize,
    pub(super) storage: Arc<CompressedStorage<S>>,
    pub(super) locks: Arc<MutexPool>,
    layout: PhantomData<L>,
}

/// Row-major sparse matrix
pub type CsrMatrix<S> = SparseMatrix<S, Csr>;

/// Column-major sparse matrix
pub type CscMatrix<S> = SparseMatrix<S, Csc>;

impl<S, L: Layout> Clone for SparseMatrix<S, L> {
    /// Shares storage and locks; O(1)
    fn clone(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            storage: Arc::clone(&self.storage),
            locks: Arc::clone(&self.locks),
            layout: PhantomData,
        }
    }
}

impl<S: fmt::Debug, L: Layout> fmt::Debug for SparseMatrix<S, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMatrix")
            .field("format", &L::FORMAT)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("storage", &self.storage)
            .field("locks", &self.locks)
            .finish()
    }
}

impl<S: Scalar, L: Layout> SparseMatrix<S, L> {
    fn assemble(
        rows: usize,
        cols: usize,
        storage: CompressedStorage<S>,
        options: &SparseMatrixOptions,
    ) -> Result<Self> {
        Ok(Self {
            rows,
            cols,
            storage: Arc::new(storage),
            locks: Arc::new(MutexPool::new(options.num_mutexes)?),
            layout: PhantomData,
        })
    }

    /// Allocate every slot of a row-wise `pattern`, zero-valued
    ///
    /// The pattern must have `rows` rows, each strictly increasing
    /// (`WrongInputGiven` otherwise) with columns below `cols`
    /// (`ShapeMismatch` otherwise).
    pub fn from_pattern(
        rows: usize,
        cols: usize,
        pattern: &SparsityPattern,
        options: &SparseMatrixOptions,
    ) -> Result<Self> {
        nonzero_size(rows, "number of rows")?;
        nonzero_size(cols, "number of columns")?;
        options.validate()?;
        if pattern.size() != rows {
            return Err(LaError::shape_mismatch(format!(
                "pattern has {} rows, matrix has {rows}",
                pattern.size()
            )));
        }

        let mut triplets = Vec::with_capacity(pattern.num_entries());
        for (row, columns) in pattern.iter().enumerate() {
            if columns.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(LaError::wrong_input(format!(
                    "pattern row {row} is not sorted and duplicate free"
                )));
            }
            if let Some(&last) = columns.last() {
                if last >= cols {
                    return Err(LaError::shape_mismatch(format!(
                        "pattern row {row} holds column {last}, matrix has {cols} columns"
                    )));
                }
            }
            for &col in columns {
                let (major, minor) = L::split(row, col);
                triplets.push((major, minor, S::zero()));
            }
        }

        let storage = compress(L::major_len(rows, cols), &triplets);
        debug!(
            format = ?L::FORMAT,
            rows,
            cols,
            stored = storage.entries.len(),
            "built sparse matrix from pattern"
        );
        Self::assemble(rows, cols, storage, options)
    }

    /// Full pattern with every slot set to `value`
    pub fn from_dense_value(
        rows: usize,
        cols: usize,
        value: S,
        options: &SparseMatrixOptions,
    ) -> Result<Self> {
        let mut matrix = Self::from_pattern(rows, cols, &SparsityPattern::dense(rows, cols), options)?;
        Arc::make_mut(&mut matrix.storage).entries.fill(value);
        Ok(matrix)
    }

    /// Import every entry of a matrix-like source
    ///
    /// With pruning enabled only entries distinguishable from zero under
    /// the options' tolerance are stored.
    pub fn from_matrix<M: MatrixLike<S> + ?Sized>(
        source: &M,
        options: &SparseMatrixOptions,
    ) -> Result<Self> {
        source.check_shape()?;
        let (rows, cols) = (source.nrows(), source.ncols());
        nonzero_size(rows, "number of rows")?;
        nonzero_size(cols, "number of columns")?;
        options.validate()?;
        let epsilon = options.epsilon_for::<S>();

        let mut triplets = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let value = source.entry_at(row, col);
                if !options.prune || float_cmp::is_nonzero(value, epsilon) {
                    let (major, minor) = L::split(row, col);
                    triplets.push((major, minor, value));
                }
            }
        }

        let storage = compress(L::major_len(rows, cols), &triplets);
        debug!(
            format = ?L::FORMAT,
            rows,
            cols,
            stored = storage.entries.len(),
            pruned = options.prune,
            "imported sparse matrix"
        );
        Self::assemble(rows, cols, storage, options)
    }

    /// Matrix without any stored entry
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::from_pattern(
            rows,
            cols,
            &SparsityPattern::new(rows),
            &SparseMatrixOptions::default(),
        )
    }

    /// Storage orientation of this matrix
    pub fn format(&self) -> SparseFormat {
        L::FORMAT
    }

    /// Number of lock buckets
    pub fn num_mutexes(&self) -> usize {
        self.locks.len()
    }

    /// Stored values in storage order
    pub fn entries(&self) -> &[S] {
        &self.storage.entries
    }

    /// Stored values for in-place modification; the structure stays fixed
    pub fn entries_mut(&mut self) -> &mut [S] {
        &mut self.storage_mut().entries
    }

    /// Row pointers (CSR) or column pointers (CSC)
    pub fn major_pointers(&self) -> &[usize] {
        &self.storage.pointers
    }

    /// Column indices (CSR) or row indices (CSC)
    pub fn minor_indices(&self) -> &[usize] {
        &self.storage.indices
    }

    /// True while storage is shared with another handle
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.storage) > 1
    }

    /// Position of `(row, col)` in [`entries`](Self::entries), if stored
    pub fn find_entry_index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let (major, minor) = L::split(row, col);
        self.storage.find(major, minor)
    }

    /// Position of `(row, col)` in [`entries`](Self::entries)
    ///
    /// Fails with `IndexOutOfRange` for coordinates outside the matrix or
    /// its pattern.
    pub fn get_entry_index(&self, row: usize, col: usize) -> Result<usize> {
        check_index(row, self.rows, "row")?;
        check_index(col, self.cols, "column")?;
        self.find_entry_index(row, col).ok_or_else(|| {
            LaError::index_out_of_range(format!("entry ({row}, {col}) is not in the pattern"))
        })
    }

    /// Clone shared storage so that this handle owns it alone
    pub(super) fn ensure_unique(&mut self) {
        if Arc::strong_count(&self.storage) > 1 {
            let locks = Arc::clone(&self.locks);
            let _guard = locks.lock_uniqueness();
            if Arc::strong_count(&self.storage) > 1 {
                debug!(
                    format = ?L::FORMAT,
                    rows = self.rows,
                    cols = self.cols,
                    stored = self.storage.entries.len(),
                    "cloning shared sparse matrix"
                );
                self.storage = Arc::new(self.storage.as_ref().clone());
                self.locks = Arc::new(self.locks.fresh());
            }
        }
    }

    pub(super) fn storage_mut(&mut self) -> &mut CompressedStorage<S> {
        self.ensure_unique();
        Arc::make_mut(&mut self.storage)
    }

    /// Swap in freshly computed storage under the whole-pool lock
    pub(super) fn replace_storage(&mut self, storage: CompressedStorage<S>, cols: usize) {
        let locks = Arc::clone(&self.locks);
        let _guard = locks.lock_all();
        self.storage = Arc::new(storage);
        self.cols = cols;
        if Arc::strong_count(&self.locks) > 2 {
            self.locks = Arc::new(self.locks.fresh());
        }
    }

    /// Drop every stored entry; the shape is unchanged
    pub fn clear(&mut self) {
        let major_len = L::major_len(self.rows, self.cols);
        self.replace_storage(CompressedStorage::empty(major_len), self.cols);
    }

    /// Become an independent copy of `other`, keeping this matrix's lock count
    pub fn deep_copy_from(&mut self, other: &Self) {
        let cols = other.cols;
        self.rows = other.rows;
        self.replace_storage(other.storage.as_ref().clone(), cols);
    }

    /// Format conversion preserving every stored entry
    pub fn convert<L2: Layout>(&self) -> SparseMatrix<S, L2> {
        let triplets: Vec<_> = self
            .stored_entries()
            .map(|(row, col, value)| {
                let (major, minor) = L2::split(row, col);
                (major, minor, value)
            })
            .collect();
        SparseMatrix {
            rows: self.rows,
            cols: self.cols,
            storage: Arc::new(compress(L2::major_len(self.rows, self.cols), &triplets)),
            locks: Arc::new(self.locks.fresh()),
            layout: PhantomData,
        }
    }

    /// Dense copy; unstored coordinates are zero
    pub fn to_dense(&self) -> DenseMatrix<S> {
        let mut values = vec![S::zero(); self.rows * self.cols];
        for (row, col, value) in self.stored_entries() {
            values[row * self.cols + col] = value;
        }
        DenseMatrix::from_parts(self.rows, self.cols, values)
    }

    fn clear_major(&mut self, major: usize) {
        let storage = self.storage_mut();
        let range = storage.range(major);
        storage.entries[range].fill(S::zero());
    }

    fn clear_minor(&mut self, minor: usize) {
        let storage = self.storage_mut();
        for (entry, &index) in storage.entries.iter_mut().zip(&storage.indices) {
            if index == minor {
                *entry = S::zero();
            }
        }
    }

    /// `y[major] = sum(entries * x[minor])`
    fn gather_into<X>(&self, x: &X, y: &mut [S])
    where
        X: VectorLike<S> + ?Sized,
    {
        let storage = self.storage.as_ref();
        for (major, y) in y.iter_mut().enumerate() {
            let mut sum = S::zero();
            for k in storage.range(major) {
                sum += storage.entries[k] * x.entry(storage.indices[k]);
            }
            *y = sum;
        }
    }

    /// `y[minor] += entries * x[major]`
    fn scatter_into<X>(&self, x: &X, y: &mut [S])
    where
        X: VectorLike<S> + ?Sized,
    {
        let storage = self.storage.as_ref();
        y.fill(S::zero());
        for major in 0..storage.major_len() {
            let x = x.entry(major);
            for k in storage.range(major) {
                y[storage.indices[k]] += storage.entries[k] * x;
            }
        }
    }
}

impl<S: Scalar> SparseMatrix<S, Csr> {
    /// Row `r` occupies `row_pointers()[r]..row_pointers()[r + 1]`
    pub fn row_pointers(&self) -> &[usize] {
        &self.storage.pointers
    }

    /// Column of every stored entry, ascending within each row
    pub fn column_indices(&self) -> &[usize] {
        &self.storage.indices
    }

    /// `y = A * x` with rows split across the rayon pool
    ///
    /// Small matrices run sequentially.
    pub fn par_mv_into<X>(&self, x: &X, y: &mut [S]) -> Result<()>
    where
        X: VectorLike<S> + Sync + ?Sized,
    {
        check_product_dims(x.dim(), y.len(), self.cols, self.rows)?;
        if self.rows < PARALLEL_MV_MIN_ROWS {
            self.gather_into(x, y);
            return Ok(());
        }
        let storage = self.storage.as_ref();
        y.par_iter_mut().enumerate().for_each(|(row, y)| {
            let mut sum = S::zero();
            for k in storage.range(row) {
                sum += storage.entries[k] * x.entry(storage.indices[k]);
            }
            *y = sum;
        });
        Ok(())
    }
}

impl<S: Scalar> SparseMatrix<S, Csc> {
    /// Column `c` occupies `column_pointers()[c]..column_pointers()[c + 1]`
    pub fn column_pointers(&self) -> &[usize] {
        &self.storage.pointers
    }

    /// Row of every stored entry, ascending within each column
    pub fn row_indices(&self) -> &[usize] {
        &self.storage.indices
    }

    /// `A^T * x` for a sparse operand, storing only nonzero results
    pub fn mtv_sparse(&self, x: &SparseVector<S>) -> Result<SparseVector<S>> {
        check_len(x.dim(), self.rows, "input vector")?;
        let mut y = SparseVector::new(self.cols)?;
        let storage = self.storage.as_ref();
        for col in 0..self.cols {
            let mut sum = S::zero();
            for k in storage.range(col) {
                sum += storage.entries[k] * x.entry(storage.indices[k]);
            }
            if float_cmp::is_nonzero_default(sum) {
                y.set_new_entry(col, sum)?;
            }
        }
        Ok(y)
    }
}

impl<S: Scalar, L: Layout> Container for SparseMatrix<S, L> {
    type Element = S;
    const BACKEND: Backend = Backend::CommonSparse;

    fn copy(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            storage: Arc::new(self.storage.as_ref().clone()),
            locks: Arc::new(self.locks.fresh()),
            layout: PhantomData,
        }
    }

    fn scal(&mut self, alpha: S) {
        self.ensure_unique();
        let locks = Arc::clone(&self.locks);
        let _guard = locks.lock_all();
        for entry in Arc::make_mut(&mut self.storage).entries.iter_mut() {
            *entry *= alpha;
        }
    }

    /// `self += alpha * x` for operands with identical patterns
    ///
    /// Fails with `ShapeMismatch` for differing shapes and with
    /// `PatternMismatch` for equal shapes with different patterns.
    fn axpy(&mut self, alpha: S, x: &Self) -> Result<()> {
        check_same_shape((self.rows, self.cols), (x.rows, x.cols))?;
        let other = Arc::clone(&x.storage);
        if !Arc::ptr_eq(&self.storage, &other)
            && (self.storage.pointers != other.pointers || self.storage.indices != other.indices)
        {
            return Err(LaError::pattern_mismatch(format!(
                "{} vs {} stored entries",
                self.storage.entries.len(),
                other.entries.len()
            )));
        }

        self.ensure_unique();
        let locks = Arc::clone(&self.locks);
        let _guard = locks.lock_all();
        let storage = Arc::make_mut(&mut self.storage);
        for (entry, &value) in storage.entries.iter_mut().zip(&other.entries) {
            *entry += alpha * value;
        }
        Ok(())
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl<S: Scalar, L: Layout> Matrix for SparseMatrix<S, L> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get_entry(&self, row: usize, col: usize) -> Result<S> {
        check_index(row, self.rows, "row")?;
        check_index(col, self.cols, "column")?;
        Ok(self
            .find_entry_index(row, col)
            .map_or(S::zero(), |index| self.storage.entries[index]))
    }

    fn set_entry(&mut self, row: usize, col: usize, value: S) -> Result<()> {
        let index = self.get_entry_index(row, col)?;
        self.ensure_unique();
        let (major, _) = L::split(row, col);
        let locks = Arc::clone(&self.locks);
        let _guard = locks.lock(major);
        Arc::make_mut(&mut self.storage).entries[index] = value;
        Ok(())
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: S) -> Result<()> {
        let index = self.get_entry_index(row, col)?;
        self.ensure_unique();
        let (major, _) = L::split(row, col);
        let locks = Arc::clone(&self.locks);
        let _guard = locks.lock(major);
        Arc::make_mut(&mut self.storage).entries[index] += value;
        Ok(())
    }

    fn clear_row(&mut self, row: usize) -> Result<()> {
        check_index(row, self.rows, "row")?;
        match L::FORMAT {
            SparseFormat::Csr => self.clear_major(row),
            SparseFormat::Csc => self.clear_minor(row),
        }
        Ok(())
    }

    fn clear_col(&mut self, col: usize) -> Result<()> {
        check_index(col, self.cols, "column")?;
        match L::FORMAT {
            SparseFormat::Csr => self.clear_minor(col),
            SparseFormat::Csc => self.clear_major(col),
        }
        Ok(())
    }

    /// Clear `row` and put a one on its diagonal
    ///
    /// The diagonal must be part of the pattern; the row is left untouched
    /// otherwise.
    fn unit_row(&mut self, row: usize) -> Result<()> {
        self.get_entry_index(row, row)?;
        self.clear_row(row)?;
        self.set_entry(row, row, S::one())
    }

    fn unit_col(&mut self, col: usize) -> Result<()> {
        self.get_entry_index(col, col)?;
        self.clear_col(col)?;
        self.set_entry(col, col, S::one())
    }

    fn non_zeros(&self) -> usize {
        self.storage.entries.len()
    }

    fn stored_entries(&self) -> impl Iterator<Item = (usize, usize, S)> + '_ {
        let storage = self.storage.as_ref();
        (0..storage.major_len()).flat_map(move |major| {
            storage.range(major).map(move |k| {
                let (row, col) = L::join(major, storage.indices[k]);
                (row, col, storage.entries[k])
            })
        })
    }

    fn mv_into<X>(&self, x: &X, y: &mut [S]) -> Result<()>
    where
        X: VectorLike<S> + ?Sized,
    {
        check_product_dims(x.dim(), y.len(), self.cols, self.rows)?;
        match L::FORMAT {
            SparseFormat::Csr => self.gather_into(x, y),
            SparseFormat::Csc => self.scatter_into(x, y),
        }
        Ok(())
    }

    fn mtv_into<X>(&self, x: &X, y: &mut [S]) -> Result<()>
    where
        X: VectorLike<S> + ?Sized,
    {
        check_product_dims(x.dim(), y.len(), self.rows, self.cols)?;
        match L::FORMAT {
            SparseFormat::Csr => self.scatter_into(x, y),
            SparseFormat::Csc => self.gather_into(x, y),
        }
        Ok(())
    }
}

impl<S: Scalar, L: Layout> MatrixLike<S> for SparseMatrix<S, L> {
    fn nrows(&self) -> usize {
        self.rows
    }

    fn ncols(&self) -> usize {
        self.cols
    }

    fn entry_at(&self, row: usize, col: usize) -> S {
        self.find_entry_index(row, col)
            .map_or(S::zero(), |index| self.storage.entries[index])
    }
}

/// Equal shape, structure and stored values
impl<S: Scalar, L: Layout> PartialEq for SparseMatrix<S, L> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.storage == other.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lacon_core::validation::validate_compressed;
    use lacon_core::{ErrorCategory, Vector};
    use num_complex::Complex;

    fn tridiagonal(size: usize) -> SparsityPattern {
        let mut pattern = SparsityPattern::new(size);
        for row in 0..size {
            for col in row.saturating_sub(1)..(row + 2).min(size) {
                pattern.insert(row, col).unwrap();
            }
        }
        pattern
    }

    fn asymmetric<L: Layout>() -> SparseMatrix<f64, L> {
        SparseMatrix::from_matrix(
            &[[1.0, 2.0, 0.0], [0.0, 3.0, 0.0], [4.0, 0.0, 5.0]],
            &SparseMatrixOptions::default().with_pruning(true),
        )
        .unwrap()
    }

    #[test]
    fn test_from_pattern_csr_layout() {
        let m = CsrMatrix::<f64>::from_pattern(4, 4, &tridiagonal(4), &Default::default()).unwrap();
        assert_eq!(m.row_pointers(), &[0, 2, 5, 8, 10]);
        assert_eq!(&m.column_indices()[..5], &[0, 1, 0, 1, 2]);
        assert_eq!(m.non_zeros(), 10);
        assert!(m.entries().iter().all(|&v| v == 0.0));
        assert!(validate_compressed(m.row_pointers(), m.column_indices(), 4, 4).is_ok());
    }

    #[test]
    fn test_from_pattern_csc_layout() {
        let pattern = SparsityPattern::from_rows(vec![vec![0, 2], vec![1], vec![0]]);
        let m = CscMatrix::<f64>::from_pattern(3, 3, &pattern, &Default::default()).unwrap();
        assert_eq!(m.column_pointers(), &[0, 2, 3, 4]);
        assert_eq!(m.row_indices(), &[0, 2, 1, 0]);
        assert!(validate_compressed(m.column_pointers(), m.row_indices(), 3, 3).is_ok());
    }

    #[test]
    fn test_from_pattern_rejects_bad_input() {
        let options = SparseMatrixOptions::default();
        let wrong_rows = CsrMatrix::<f64>::from_pattern(3, 4, &tridiagonal(4), &options);
        assert!(matches!(wrong_rows, Err(LaError::ShapeMismatch(_))));

        let wide = SparsityPattern::from_rows(vec![vec![0, 5]]);
        let out_of_range = CsrMatrix::<f64>::from_pattern(1, 3, &wide, &options);
        assert!(matches!(out_of_range, Err(LaError::ShapeMismatch(_))));

        let unsorted = SparsityPattern::from_rows(vec![vec![2, 0]]);
        let result = CscMatrix::<f64>::from_pattern(1, 3, &unsorted, &options);
        assert!(matches!(result, Err(LaError::WrongInputGiven(_))));

        let empty = CsrMatrix::<f64>::from_pattern(0, 3, &SparsityPattern::new(0), &options);
        assert!(matches!(empty, Err(LaError::WrongInputGiven(_))));

        let no_locks = options.with_num_mutexes(0);
        let result = CsrMatrix::<f64>::from_pattern(4, 4, &tridiagonal(4), &no_locks);
        assert!(matches!(result, Err(LaError::WrongInputGiven(_))));
    }

    #[test]
    fn test_closed_pattern() {
        let mut m = CsrMatrix::<f64>::from_pattern(4, 4, &tridiagonal(4), &Default::default()).unwrap();
        m.set_entry(1, 2, 5.0).unwrap();
        m.add_to_entry(1, 2, 1.0).unwrap();
        assert_eq!(m.get_entry(1, 2).unwrap(), 6.0);
        assert_eq!(m.get_entry(0, 3).unwrap(), 0.0);

        let err = m.set_entry(0, 3, 1.0).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Index);
        assert!(m.add_to_entry(3, 0, 1.0).is_err());
        assert!(m.get_entry(4, 0).is_err());
        assert_eq!(m.find_entry_index(0, 3), None);
        assert_eq!(m.find_entry_index(1, 2), Some(4));
    }

    #[test]
    fn test_clone_shares_until_write() {
        let mut a = CsrMatrix::from_dense_value(2, 2, 1.0, &Default::default()).unwrap();
        let b = a.clone();
        assert!(a.is_shared());
        assert!(Arc::ptr_eq(&a.locks, &b.locks));

        a.set_entry(0, 0, 7.0).unwrap();
        assert!(!a.is_shared());
        assert!(!Arc::ptr_eq(&a.locks, &b.locks));
        assert_eq!(b.get_entry(0, 0).unwrap(), 1.0);
        assert_eq!(a.get_entry(0, 0).unwrap(), 7.0);
    }

    #[test]
    fn test_from_dense_value_both_layouts() {
        let csr = CsrMatrix::from_dense_value(2, 3, 0.0, &Default::default()).unwrap();
        let csc = CscMatrix::from_dense_value(2, 3, 2.5, &Default::default()).unwrap();
        assert_eq!(csr.non_zeros(), 6);
        assert_eq!(csc.non_zeros(), 6);
        assert_eq!(csc.get_entry(1, 2).unwrap(), 2.5);
    }

    #[test]
    fn test_mv_and_mtv_asymmetric() {
        let csr = asymmetric::<Csr>();
        let csc = asymmetric::<Csc>();
        let x = [1.0, 2.0, 3.0];
        // A = [[1,2,0],[0,3,0],[4,0,5]]
        assert_eq!(csr.mv(&x).unwrap(), vec![5.0, 6.0, 19.0]);
        assert_eq!(csc.mv(&x).unwrap(), vec![5.0, 6.0, 19.0]);
        assert_eq!(csr.mtv(&x).unwrap(), vec![13.0, 8.0, 15.0]);
        assert_eq!(csc.mtv(&x).unwrap(), vec![13.0, 8.0, 15.0]);
        assert!(matches!(csr.mv(&[1.0, 2.0]), Err(LaError::ShapeMismatch(_))));
    }

    #[test]
    fn test_par_mv_matches_sequential() {
        let size = PARALLEL_MV_MIN_ROWS + 7;
        let mut m = CsrMatrix::<f64>::from_pattern(size, size, &tridiagonal(size), &Default::default())
            .unwrap();
        for row in 0..size {
            m.set_entry(row, row, 2.0 + row as f64).unwrap();
            if row > 0 {
                m.set_entry(row, row - 1, -1.0).unwrap();
            }
        }
        let x: Vec<f64> = (0..size).map(|i| (i % 5) as f64).collect();
        let mut parallel = vec![0.0; size];
        m.par_mv_into(&x, &mut parallel).unwrap();
        assert_eq!(parallel, m.mv(&x).unwrap());
    }

    #[test]
    fn test_mtv_sparse_skips_zeros() {
        let csc = asymmetric::<Csc>();
        let x = SparseVector::from_entries(3, [(1, 1.0)]).unwrap();
        let y = csc.mtv_sparse(&x).unwrap();
        // second row of A is [0, 3, 0]
        assert_eq!(y.nonzero_indices(), &[1]);
        assert_eq!(y.get_entry(1).unwrap(), 3.0);
        assert_eq!(y.size(), 3);
    }

    #[test]
    fn test_clear_rows_and_columns() {
        let mut csr = asymmetric::<Csr>();
        let mut csc = asymmetric::<Csc>();
        csr.clear_row(2).unwrap();
        csc.clear_row(2).unwrap();
        csr.clear_col(1).unwrap();
        csc.clear_col(1).unwrap();
        assert_eq!(csr.to_dense(), csc.to_dense());
        assert_eq!(csr.to_dense().as_slice(), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(csr.non_zeros(), 5);
    }

    #[test]
    fn test_unit_row_requires_diagonal() {
        let mut m = asymmetric::<Csr>();
        m.unit_row(2).unwrap();
        assert_eq!(m.to_dense().row(2).unwrap(), &[0.0, 0.0, 1.0]);

        let before = m.clone();
        m.unit_row(2).unwrap();
        assert_eq!(m, before);

        // (1, 0) holds no diagonal entry; nothing may change
        let pattern = SparsityPattern::from_rows(vec![vec![0], vec![0]]);
        let mut m = CsrMatrix::from_pattern(2, 2, &pattern, &Default::default()).unwrap();
        m.set_entry(1, 0, 3.0).unwrap();
        assert!(m.unit_row(1).is_err());
        assert_eq!(m.get_entry(1, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_axpy_requires_equal_pattern() {
        let mut a = asymmetric::<Csr>();
        let b = a.copy();
        a.axpy(2.0, &b).unwrap();
        assert_eq!(a.get_entry(2, 2).unwrap(), 15.0);

        let shared = a.clone();
        a.axpy(-1.0, &shared).unwrap();
        assert!(a.entries().iter().all(|&v| v == 0.0));
        assert_eq!(shared.get_entry(2, 2).unwrap(), 15.0);

        let other = CsrMatrix::from_dense_value(3, 3, 1.0, &Default::default()).unwrap();
        assert!(matches!(a.axpy(1.0, &other), Err(LaError::PatternMismatch(_))));
        let small = CsrMatrix::from_dense_value(2, 3, 1.0, &Default::default()).unwrap();
        assert!(matches!(a.axpy(1.0, &small), Err(LaError::ShapeMismatch(_))));
    }

    #[test]
    fn test_add_sub() {
        let a = asymmetric::<Csc>();
        let sum = a.add(&a).unwrap();
        assert_eq!(sum.get_entry(2, 0).unwrap(), 8.0);
        let difference = sum.sub(&a).unwrap();
        assert_eq!(difference, a);

        let mut b = a.clone();
        b.iadd(&a).unwrap();
        b.isub(&a).unwrap();
        assert_eq!(b, a);
    }

    #[test]
    fn test_pattern_and_pruning() {
        let mut m = asymmetric::<Csr>();
        m.set_entry(1, 1, 1e-20).unwrap();
        assert!(m.pattern(false, 1e-15).contains(1, 1));
        let pruned = m.pattern(true, 1e-15);
        assert!(!pruned.contains(1, 1));
        assert_eq!(pruned.num_entries(), 4);
        assert_eq!(asymmetric::<Csc>().pattern(false, 1e-15), asymmetric::<Csr>().pattern(false, 1e-15));
    }

    #[test]
    fn test_valid_and_norms() {
        let mut m = asymmetric::<Csc>();
        assert!(m.valid());
        assert_eq!(m.sup_norm(), 5.0);
        m.set_entry(0, 1, f64::NAN).unwrap();
        assert!(!m.valid());
    }

    #[test]
    fn test_convert_and_clear() {
        let csr = asymmetric::<Csr>();
        let csc: CscMatrix<f64> = csr.convert();
        assert_eq!(csc.row_indices(), &[0, 2, 0, 1, 2]);
        assert_eq!(csc.to_dense(), csr.to_dense());
        assert_eq!(csc.convert::<Csr>(), csr);

        let mut cleared = csr.clone();
        cleared.clear();
        assert_eq!(cleared.non_zeros(), 0);
        assert_eq!(cleared.row_pointers(), &[0, 0, 0, 0]);
        assert_eq!((cleared.rows(), cleared.cols()), (3, 3));
        assert_eq!(csr.non_zeros(), 5);
    }

    #[test]
    fn test_deep_copy_from() {
        let source = asymmetric::<Csr>();
        let mut target = CsrMatrix::<f64>::zeros(1, 1).unwrap();
        target.deep_copy_from(&source);
        assert_eq!(target, source);
        assert!(!target.is_shared());
        assert!(!source.is_shared());
    }

    #[test]
    fn test_entries_mut_clones_shared() {
        let mut a = asymmetric::<Csr>();
        let b = a.clone();
        a.entries_mut()[0] = 10.0;
        assert_eq!(a.get_entry(0, 0).unwrap(), 10.0);
        assert_eq!(b.get_entry(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_options_lock_count() {
        let options = SparseMatrixOptions::default().with_num_mutexes(3);
        let m = CsrMatrix::<f64>::from_pattern(4, 4, &tridiagonal(4), &options).unwrap();
        assert_eq!(m.num_mutexes(), 3);
        assert_eq!(m.copy().num_mutexes(), 3);
        assert_eq!(m.format(), SparseFormat::Csr);
        assert_eq!(m.backend(), Backend::CommonSparse);
    }

    #[test]
    fn test_from_matrix_rejects_ragged_rows() {
        let ragged = vec![vec![1.0, 2.0, 3.0], vec![4.0]];
        let options = SparseMatrixOptions::default().with_pruning(true);
        assert!(matches!(
            CsrMatrix::<f64>::from_matrix(&ragged, &options),
            Err(LaError::ShapeMismatch(_))
        ));
        assert!(matches!(
            CscMatrix::<f64>::from_matrix(&ragged, &Default::default()),
            Err(LaError::ShapeMismatch(_))
        ));
    }

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn test_complex_import_and_products() {
        let (zero, one, i) = (c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0));
        let source = [[one, zero], [i, one]];
        let options = SparseMatrixOptions::default().with_pruning(true);
        let csr = CsrMatrix::<Complex<f64>>::from_matrix(&source, &options).unwrap();
        let mut csc = CscMatrix::<Complex<f64>>::from_matrix(&source, &options).unwrap();
        assert_eq!(csc.non_zeros(), 3);
        assert_eq!(csc.row_indices(), &[0, 1, 1]);

        let ones = [one, one];
        assert_eq!(csr.mv(&ones).unwrap(), vec![one, c(1.0, 1.0)]);
        assert_eq!(csc.mv(&ones).unwrap(), vec![one, c(1.0, 1.0)]);
        // transpose without conjugation
        assert_eq!(csr.mtv(&ones).unwrap(), vec![c(1.0, 1.0), one]);
        assert_eq!(csc.mtv(&ones).unwrap(), vec![c(1.0, 1.0), one]);

        csc.scal(i);
        assert_eq!(csc.mv(&ones).unwrap(), vec![i, c(-1.0, 1.0)]);
        assert_eq!(csr.get_entry(1, 0).unwrap(), i);
    }

    #[test]
    fn test_complex_mtv_sparse_and_validity() {
        let (zero, one, i) = (c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0));
        let options = SparseMatrixOptions::default().with_pruning(true);
        let mut csc = CscMatrix::<Complex<f64>>::from_matrix(&[[one, zero], [i, one]], &options)
            .unwrap();

        let x = SparseVector::from_entries(2, [(1, i)]).unwrap();
        let y = csc.mtv_sparse(&x).unwrap();
        assert_eq!(y.nonzero_indices(), &[0, 1]);
        assert_eq!(y.values(), &[c(-1.0, 0.0), i]);

        assert!(csc.valid());
        csc.set_entry(1, 1, c(1.0, f64::NAN)).unwrap();
        assert!(!csc.valid());
    }

    #[test]
    fn test_f32_pruning_uses_single_precision_tolerance() {
        let source = [[1.0f32, 1e-7], [5e-6, 0.0]];
        let pruned =
            CsrMatrix::<f32>::from_matrix(&source, &SparseMatrixOptions::default().with_pruning(true))
                .unwrap();
        assert_eq!(pruned.non_zeros(), 2);
        assert_eq!(pruned.column_indices(), &[0, 0]);
        assert_eq!(pruned.get_entry(0, 1).unwrap(), 0.0);
        assert_eq!(pruned.get_entry(1, 0).unwrap(), 5e-6);

        let kept = CsrMatrix::<f32>::from_matrix(
            &source,
            &SparseMatrixOptions::default().with_pruning(true).with_epsilon(1e-9),
        )
        .unwrap();
        assert_eq!(kept.non_zeros(), 3);
    }
}
