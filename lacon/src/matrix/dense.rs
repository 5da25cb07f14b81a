//! Copy-on-write dense matrix
//!
//! Row-major storage behind an `Arc`. Serves as the dense source for
//! pruning import, the target of sparse-to-dense export and the input of
//! the eigen solver.

use std::sync::Arc;

use lacon_core::traits::container::check_product_dims;
use lacon_core::validation::{check_index, check_same_shape, nonzero_size};
use lacon_core::{Backend, Container, LaError, Matrix, MatrixLike, Result, Scalar, VectorLike};
use nalgebra::DMatrix;
use tracing::debug;

/// Row-major dense matrix sharing its storage until written
#[derive(Debug, Clone)]
pub struct DenseMatrix<S> {
    rows: usize,
    cols: usize,
    values: Arc<Vec<S>>,
}

impl<S: Scalar> DenseMatrix<S> {
    /// `rows x cols` copies of `value`; zero dimensions are rejected
    pub fn new(rows: usize, cols: usize, value: S) -> Result<Self> {
        nonzero_size(rows, "number of rows")?;
        nonzero_size(cols, "number of columns")?;
        Ok(Self {
            rows,
            cols,
            values: Arc::new(vec![value; rows * cols]),
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, S::zero())
    }

    /// Square matrix with ones on the diagonal
    pub fn identity(size: usize) -> Result<Self> {
        let mut matrix = Self::zeros(size, size)?;
        let values = Arc::make_mut(&mut matrix.values);
        for i in 0..size {
            values[i * size + i] = S::one();
        }
        Ok(matrix)
    }

    /// Take ownership of row-major `values`
    pub fn from_row_major(rows: usize, cols: usize, values: Vec<S>) -> Result<Self> {
        nonzero_size(rows, "number of rows")?;
        nonzero_size(cols, "number of columns")?;
        if values.len() != rows * cols {
            return Err(LaError::shape_mismatch(format!(
                "{} values cannot fill a {rows}x{cols} matrix",
                values.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            values: Arc::new(values),
        })
    }

    /// Build from equally long rows
    pub fn from_rows(rows: &[Vec<S>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(LaError::shape_mismatch(format!(
                "row {index} has {} entries, expected {cols}",
                row.len()
            )));
        }
        Self::from_row_major(rows.len(), cols, rows.concat())
    }

    /// Copy any matrix-like source
    pub fn from_matrix<M: MatrixLike<S> + ?Sized>(source: &M) -> Result<Self> {
        source.check_shape()?;
        let (rows, cols) = (source.nrows(), source.ncols());
        let mut values = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                values.push(source.entry_at(row, col));
            }
        }
        Self::from_row_major(rows, cols, values)
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, values: Vec<S>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self {
            rows,
            cols,
            values: Arc::new(values),
        }
    }

    pub fn as_slice(&self) -> &[S] {
        &self.values
    }

    /// Entries of one row
    pub fn row(&self, row: usize) -> Result<&[S]> {
        check_index(row, self.rows, "row")?;
        Ok(&self.values[row * self.cols..(row + 1) * self.cols])
    }

    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.values) > 1
    }

    fn values_mut(&mut self) -> &mut Vec<S> {
        if self.is_shared() {
            debug!(rows = self.rows, cols = self.cols, "cloning shared dense matrix");
        }
        Arc::make_mut(&mut self.values)
    }

    fn check_coordinate(&self, row: usize, col: usize) -> Result<usize> {
        check_index(row, self.rows, "row")?;
        check_index(col, self.cols, "column")?;
        Ok(row * self.cols + col)
    }
}

impl<S: Scalar + nalgebra::Scalar> DenseMatrix<S> {
    pub fn to_nalgebra(&self) -> DMatrix<S> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.values)
    }

    pub fn from_nalgebra(matrix: &DMatrix<S>) -> Result<Self> {
        Self::from_matrix(matrix)
    }
}

impl<S: Scalar> Container for DenseMatrix<S> {
    type Element = S;
    const BACKEND: Backend = Backend::CommonDense;

    fn copy(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            values: Arc::new(self.values.as_ref().clone()),
        }
    }

    fn scal(&mut self, alpha: S) {
        for value in self.values_mut().iter_mut() {
            *value *= alpha;
        }
    }

    fn axpy(&mut self, alpha: S, x: &Self) -> Result<()> {
        check_same_shape((self.rows, self.cols), (x.rows, x.cols))?;
        let x = Arc::clone(&x.values);
        for (y, x) in self.values_mut().iter_mut().zip(x.iter()) {
            *y += alpha * *x;
        }
        Ok(())
    }

    fn has_equal_shape(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl<S: Scalar> Matrix for DenseMatrix<S> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get_entry(&self, row: usize, col: usize) -> Result<S> {
        let index = self.check_coordinate(row, col)?;
        Ok(self.values[index])
    }

    fn set_entry(&mut self, row: usize, col: usize, value: S) -> Result<()> {
        let index = self.check_coordinate(row, col)?;
        self.values_mut()[index] = value;
        Ok(())
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: S) -> Result<()> {
        let index = self.check_coordinate(row, col)?;
        self.values_mut()[index] += value;
        Ok(())
    }

    fn clear_row(&mut self, row: usize) -> Result<()> {
        check_index(row, self.rows, "row")?;
        let cols = self.cols;
        self.values_mut()[row * cols..(row + 1) * cols].fill(S::zero());
        Ok(())
    }

    fn clear_col(&mut self, col: usize) -> Result<()> {
        check_index(col, self.cols, "column")?;
        let cols = self.cols;
        for value in self.values_mut().iter_mut().skip(col).step_by(cols) {
            *value = S::zero();
        }
        Ok(())
    }

    fn non_zeros(&self) -> usize {
        self.values.len()
    }

    fn stored_entries(&self) -> impl Iterator<Item = (usize, usize, S)> + '_ {
        let cols = self.cols;
        self.values
            .iter()
            .enumerate()
            .map(move |(index, &value)| (index / cols, index % cols, value))
    }

    fn mv_into<X>(&self, x: &X, y: &mut [S]) -> Result<()>
    where
        X: VectorLike<S> + ?Sized,
    {
        check_product_dims(x.dim(), y.len(), self.cols, self.rows)?;
        for (row, y) in self.values.chunks_exact(self.cols).zip(y.iter_mut()) {
            let mut sum = S::zero();
            for (col, &value) in row.iter().enumerate() {
                sum += value * x.entry(col);
            }
            *y = sum;
        }
        Ok(())
    }

    fn mtv_into<X>(&self, x: &X, y: &mut [S]) -> Result<()>
    where
        X: VectorLike<S> + ?Sized,
    {
        check_product_dims(x.dim(), y.len(), self.rows, self.cols)?;
        y.fill(S::zero());
        for (row_index, row) in self.values.chunks_exact(self.cols).enumerate() {
            let x = x.entry(row_index);
            for (y, &value) in y.iter_mut().zip(row) {
                *y += value * x;
            }
        }
        Ok(())
    }
}

impl<S: Scalar> MatrixLike<S> for DenseMatrix<S> {
    fn nrows(&self) -> usize {
        self.rows
    }

    fn ncols(&self) -> usize {
        self.cols
    }

    fn entry_at(&self, row: usize, col: usize) -> S {
        self.values[row * self.cols + col]
    }
}

impl<S: Scalar> PartialEq for DenseMatrix<S> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.values == other.values
    }
}
