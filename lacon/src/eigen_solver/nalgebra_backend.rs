//! Eigen backends built on nalgebra's decompositions

use nalgebra::{DMatrix, DVector, Schur, SymmetricEigen, SVD};
use num_complex::Complex;

use lacon_core::{LaError, Result};

use super::EigenBackend;
use crate::config::EigenSolverOptions;

/// Eigenvalues within this relative distance count as one repeated value
const REPEATED_EIGENVALUE_TOLERANCE: f64 = 1e-8;

/// General real matrices via a real Schur decomposition
///
/// Eigenvectors are taken from the null space of `A - lambda I`, computed
/// by a complex SVD per eigenvalue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchurBackend;

/// Symmetric matrices via a symmetric eigendecomposition
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricBackend;

fn schur_eigenvalues(
    matrix: &DMatrix<f64>,
    options: &EigenSolverOptions,
) -> Result<Vec<Complex<f64>>> {
    let schur = Schur::try_new(matrix.clone(), options.tolerance, options.max_iterations)
        .ok_or_else(|| LaError::eigen_solver_failed("real Schur decomposition did not converge"))?;
    Ok(schur.complex_eigenvalues().iter().copied().collect())
}

/// Unit vector spanning part of the null space of `matrix - lambda I`
///
/// `multiplicity_index` selects the right singular vector belonging to the
/// n-th smallest singular value, so repeated eigenvalues receive distinct
/// vectors.
fn null_vector(
    matrix: &DMatrix<f64>,
    lambda: Complex<f64>,
    multiplicity_index: usize,
    options: &EigenSolverOptions,
) -> Result<DVector<Complex<f64>>> {
    let size = matrix.nrows();
    let mut shifted = matrix.map(|value| Complex::new(value, 0.0));
    for i in 0..size {
        shifted[(i, i)] -= lambda;
    }

    let svd = SVD::try_new(
        shifted,
        false,
        true,
        options.tolerance,
        options.max_iterations,
    )
    .ok_or_else(|| LaError::eigen_solver_failed(format!("SVD for eigenvalue {lambda} did not converge")))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| LaError::eigen_solver_failed("SVD returned no right singular vectors"))?;

    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| svd.singular_values[a].total_cmp(&svd.singular_values[b]));
    let index = order
        .get(multiplicity_index.min(order.len().saturating_sub(1)))
        .copied()
        .ok_or_else(|| LaError::eigen_solver_failed("empty matrix"))?;

    Ok(v_t.row(index).transpose().map(|value| value.conj()))
}

impl EigenBackend for SchurBackend {
    fn eigenvalues(
        &self,
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<Vec<Complex<f64>>> {
        schur_eigenvalues(matrix, options)
    }

    fn eigendecomposition(
        &self,
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<(Vec<Complex<f64>>, DMatrix<Complex<f64>>)> {
        let values = schur_eigenvalues(matrix, options)?;
        let size = matrix.nrows();
        let mut vectors = DMatrix::from_element(size, size, Complex::new(0.0, 0.0));
        for (col, &lambda) in values.iter().enumerate() {
            let scale = lambda.norm().max(1.0);
            let multiplicity_index = values[..col]
                .iter()
                .filter(|&&other| (other - lambda).norm() <= REPEATED_EIGENVALUE_TOLERANCE * scale)
                .count();
            let vector = null_vector(matrix, lambda, multiplicity_index, options)?;
            vectors.set_column(col, &vector);
        }
        Ok((values, vectors))
    }
}

impl SymmetricBackend {
    fn decompose(
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<SymmetricEigen<f64, nalgebra::Dyn>> {
        let size = matrix.nrows();
        for row in 0..size {
            for col in row + 1..size {
                let gap = (matrix[(row, col)] - matrix[(col, row)]).abs();
                if gap > options.symmetry_tolerance {
                    return Err(LaError::eigen_solver_failed(format!(
                        "matrix is not symmetric at ({row}, {col}), difference {gap}"
                    )));
                }
            }
        }
        SymmetricEigen::try_new(matrix.clone(), options.tolerance, options.max_iterations)
            .ok_or_else(|| LaError::eigen_solver_failed("symmetric eigendecomposition did not converge"))
    }
}

impl EigenBackend for SymmetricBackend {
    fn eigenvalues(
        &self,
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<Vec<Complex<f64>>> {
        let eigen = Self::decompose(matrix, options)?;
        Ok(eigen
            .eigenvalues
            .iter()
            .map(|&value| Complex::new(value, 0.0))
            .collect())
    }

    fn eigendecomposition(
        &self,
        matrix: &DMatrix<f64>,
        options: &EigenSolverOptions,
    ) -> Result<(Vec<Complex<f64>>, DMatrix<Complex<f64>>)> {
        let eigen = Self::decompose(matrix, options)?;
        let values = eigen
            .eigenvalues
            .iter()
            .map(|&value| Complex::new(value, 0.0))
            .collect();
        let vectors = eigen.eigenvectors.map(|value| Complex::new(value, 0.0));
        Ok((values, vectors))
    }
}
