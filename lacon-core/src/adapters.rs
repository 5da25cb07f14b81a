//! nalgebra dense types as container operands
//!
//! `DMatrix` and `DVector` are accepted wherever a [`MatrixLike`] or
//! [`VectorLike`] operand is, so products and pruning import work on them
//! without copying.

use nalgebra::{DMatrix, DVector};

use crate::{MatrixLike, VectorLike};

impl<S: nalgebra::Scalar + Copy> MatrixLike<S> for DMatrix<S> {
    fn nrows(&self) -> usize {
        self.shape().0
    }

    fn ncols(&self) -> usize {
        self.shape().1
    }

    fn entry_at(&self, row: usize, col: usize) -> S {
        self[(row, col)]
    }
}

impl<S: nalgebra::Scalar + Copy> VectorLike<S> for DVector<S> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn entry(&self, index: usize) -> S {
        self[index]
    }
}
