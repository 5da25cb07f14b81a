//! Read-only matrix and vector abstractions
//!
//! Operations such as matrix-vector products, pruning import and
//! right-multiplication accept any operand that exposes its dimensions and
//! element access. These traits are that capability; they are implemented
//! for the library's own containers, for plain slices and nested vectors,
//! and (with the `nalgebra` feature) for nalgebra's dynamic types.

use crate::{LaError, Result};

/// Anything with a length and element access
pub trait VectorLike<S> {
    /// Number of elements
    fn dim(&self) -> usize;

    /// Element at `index`; callers guarantee `index < self.dim()`
    fn entry(&self, index: usize) -> S;
}

/// Anything with a row/column count and element access
pub trait MatrixLike<S> {
    /// Number of rows
    fn nrows(&self) -> usize;

    /// Number of columns
    fn ncols(&self) -> usize;

    /// Element at (`row`, `col`); callers guarantee the coordinate is in bounds
    fn entry_at(&self, row: usize, col: usize) -> S;

    /// Reject sources whose element access does not cover `nrows x ncols`
    fn check_shape(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: Copy> VectorLike<S> for [S] {
    fn dim(&self) -> usize {
        self.len()
    }

    fn entry(&self, index: usize) -> S {
        self[index]
    }
}

impl<S: Copy> VectorLike<S> for Vec<S> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn entry(&self, index: usize) -> S {
        self[index]
    }
}

impl<S: Copy, const N: usize> VectorLike<S> for [S; N] {
    fn dim(&self) -> usize {
        N
    }

    fn entry(&self, index: usize) -> S {
        self[index]
    }
}

/// Row-major nested vectors; the column count is taken from the first row
impl<S: Copy> MatrixLike<S> for Vec<Vec<S>> {
    fn nrows(&self) -> usize {
        self.len()
    }

    fn ncols(&self) -> usize {
        self.first().map_or(0, Vec::len)
    }

    fn entry_at(&self, row: usize, col: usize) -> S {
        self[row][col]
    }

    /// Every row must be as long as the first one
    fn check_shape(&self) -> Result<()> {
        let cols = self.ncols();
        match self.iter().position(|row| row.len() != cols) {
            Some(index) => Err(LaError::shape_mismatch(format!(
                "row {index} has {} entries, expected {cols}",
                self[index].len()
            ))),
            None => Ok(()),
        }
    }
}

impl<S: Copy, const R: usize, const C: usize> MatrixLike<S> for [[S; C]; R] {
    fn nrows(&self) -> usize {
        R
    }

    fn ncols(&self) -> usize {
        C
    }

    fn entry_at(&self, row: usize, col: usize) -> S {
        self[row][col]
    }
}

impl<S, T: VectorLike<S> + ?Sized> VectorLike<S> for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn entry(&self, index: usize) -> S {
        (**self).entry(index)
    }
}

impl<S, T: MatrixLike<S> + ?Sized> MatrixLike<S> for &T {
    fn nrows(&self) -> usize {
        (**self).nrows()
    }

    fn ncols(&self) -> usize {
        (**self).ncols()
    }

    fn entry_at(&self, row: usize, col: usize) -> S {
        (**self).entry_at(row, col)
    }

    fn check_shape(&self) -> Result<()> {
        (**self).check_shape()
    }
}
