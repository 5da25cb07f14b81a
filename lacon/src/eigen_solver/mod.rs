//! Eigenvalue and eigenvector dispatch
//!
//! The numeric work is delegated to a backend selected by
//! [`EigenSolverOptions::solver_type`]. Every backend failure is reported
//! as `EigenSolverFailed`; nothing is retried.

pub mod nalgebra_backend;

use nalgebra::DMatrix;
use num_complex::Complex;
use tracing::warn;

use lacon_core::{LaError, Matrix, Result};

use crate::config::{EigenSolverOptions, EigenSolverType};
use crate::matrix::DenseMatrix;
pub use nalgebra_backend::{SchurBackend, SymmetricBackend};

/// A numeric routine computing the spectrum of a dense square matrix
pub trait EigenBackend {
    /// Every eigenvalue, in backend order
    fn eigenvalues(
        &self,
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<Vec<Complex<f64>>>;

    /// Every eigenvalue with a unit eigenvector per column, in matching order
    fn eigendecomposition(
        &self,
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<(Vec<Complex<f64>>, DMatrix<Complex<f64>>)>;
}

/// Backend implementing `solver_type`
pub fn backend(solver_type: EigenSolverType) -> Box<dyn EigenBackend> {
    match solver_type {
        EigenSolverType::Schur => Box::new(SchurBackend),
        EigenSolverType::Symmetric => Box::new(SymmetricBackend),
    }
}

/// Eigen solver bound to one dense square matrix
pub struct EigenSolver {
    matrix: DMatrix<f64>,
    options: EigenSolverOptions,
}

impl EigenSolver {
    /// Fails with `ShapeMismatch` for non-square input and, when
    /// `check_for_inf_nan` is set, with `EigenSolverFailed` for NaN or
    /// infinite entries.
    pub fn new(matrix: &DenseMatrix<f64>, options: EigenSolverOptions) -> Result<Self> {
        if matrix.rows() != matrix.cols() {
            return Err(LaError::shape_mismatch(format!(
                "eigen solver needs a square matrix, got {}x{}",
                matrix.rows(),
                matrix.cols()
            )));
        }
        if options.check_for_inf_nan && !matrix.valid() {
            return Err(LaError::eigen_solver_failed(
                "matrix contains NaN or infinite entries",
            ));
        }
        Ok(Self {
            matrix: matrix.to_nalgebra(),
            options,
        })
    }

    pub fn options(&self) -> &EigenSolverOptions {
        &self.options
    }

    pub fn eigenvalues(&self) -> Result<Vec<Complex<f64>>> {
        backend(self.options.solver_type)
            .eigenvalues(&self.matrix, &self.options)
            .map_err(|err| {
                warn!(solver = %self.options.solver_type, %err, "eigenvalues failed");
                err
            })
    }

    /// Eigenvalues whose imaginary parts are within `tolerance` of zero
    ///
    /// Fails with `EigenSolverFailed` if any eigenvalue is complex.
    pub fn real_eigenvalues(&self, tolerance: f64) -> Result<Vec<f64>> {
        self.eigenvalues()?
            .into_iter()
            .map(|value| {
                if value.im.abs() > tolerance {
                    Err(LaError::eigen_solver_failed(format!(
                        "eigenvalue {value} is not real"
                    )))
                } else {
                    Ok(value.re)
                }
            })
            .collect()
    }

    /// Eigenvectors as the columns of a dense matrix
    pub fn eigenvectors(&self) -> Result<DenseMatrix<Complex<f64>>> {
        Ok(self.eigendecomposition()?.1)
    }

    /// Eigenvalues and the matching eigenvectors (as columns)
    pub fn eigendecomposition(&self) -> Result<(Vec<Complex<f64>>, DenseMatrix<Complex<f64>>)> {
        let (values, vectors) = backend(self.options.solver_type)
            .eigendecomposition(&self.matrix, &self.options)
            .map_err(|err| {
                warn!(solver = %self.options.solver_type, %err, "eigendecomposition failed");
                err
            })?;
        Ok((values, DenseMatrix::from_nalgebra(&vectors)?))
    }
}
