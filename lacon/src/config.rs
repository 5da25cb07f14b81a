//! Configuration for sparse matrices and the eigen solver dispatch

use std::fmt;
use std::str::FromStr;

use lacon_core::validation::nonzero_size;
use lacon_core::{LaError, Result, Scalar};

/// Options for building a sparse matrix
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SparseMatrixOptions {
    /// Number of mutexes guarding row (CSR) or column (CSC) buckets
    pub num_mutexes: usize,
    /// Drop entries indistinguishable from zero on import
    pub prune: bool,
    /// Pruning tolerance; `None` uses the scalar type's default
    pub epsilon: Option<f64>,
}

impl SparseMatrixOptions {
    /// Set the number of lock buckets
    pub fn with_num_mutexes(mut self, num_mutexes: usize) -> Self {
        self.num_mutexes = num_mutexes;
        self
    }

    /// Enable or disable pruning on import
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Set the pruning tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Pruning tolerance for scalar type `S`
    pub fn epsilon_for<S: Scalar>(&self) -> f64 {
        self.epsilon.unwrap_or_else(S::default_epsilon)
    }

    /// Reject a zero mutex count or a negative/NaN tolerance
    pub fn validate(&self) -> Result<()> {
        nonzero_size(self.num_mutexes, "number of mutexes")?;
        if let Some(epsilon) = self.epsilon {
            if epsilon.is_nan() || epsilon < 0.0 {
                return Err(LaError::wrong_input(format!(
                    "tolerance {epsilon} must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SparseMatrixOptions {
    fn default() -> Self {
        Self {
            num_mutexes: 1,
            prune: false,
            epsilon: None,
        }
    }
}

/// Available eigen solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EigenSolverType {
    /// General real matrices through a real Schur decomposition
    Schur,
    /// Symmetric matrices; real spectrum
    Symmetric,
}

impl EigenSolverType {
    pub const ALL: [EigenSolverType; 2] = [EigenSolverType::Schur, EigenSolverType::Symmetric];

    pub fn name(&self) -> &'static str {
        match self {
            EigenSolverType::Schur => "schur",
            EigenSolverType::Symmetric => "symmetric",
        }
    }
}

impl fmt::Display for EigenSolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EigenSolverType {
    type Err = LaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                LaError::wrong_input(format!(
                    "unknown eigen solver type '{s}', available: {}",
                    EigenSolverOptions::types().join(", ")
                ))
            })
    }
}

/// Options for the eigen solver dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EigenSolverOptions {
    pub solver_type: EigenSolverType,
    /// Convergence tolerance handed to the backend
    pub tolerance: f64,
    /// Iteration limit; zero lets the backend iterate until convergence
    pub max_iterations: usize,
    /// Largest `|a_ij - a_ji|` accepted by the symmetric backend
    pub symmetry_tolerance: f64,
    /// Reject matrices containing NaN or infinite entries before solving
    pub check_for_inf_nan: bool,
}

impl EigenSolverOptions {
    /// Names of all available backends
    pub fn types() -> Vec<&'static str> {
        EigenSolverType::ALL.iter().map(EigenSolverType::name).collect()
    }

    /// Default options for the backend called `name`
    pub fn options(name: &str) -> Result<Self> {
        Ok(Self::default().with_solver_type(name.parse()?))
    }

    pub fn with_solver_type(mut self, solver_type: EigenSolverType) -> Self {
        self.solver_type = solver_type;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_symmetry_tolerance(mut self, symmetry_tolerance: f64) -> Self {
        self.symmetry_tolerance = symmetry_tolerance;
        self
    }

    pub fn with_inf_nan_check(mut self, check_for_inf_nan: bool) -> Self {
        self.check_for_inf_nan = check_for_inf_nan;
        self
    }
}

impl Default for EigenSolverOptions {
    fn default() -> Self {
        Self {
            solver_type: EigenSolverType::Schur,
            tolerance: f64::EPSILON,
            max_iterations: 0,
            symmetry_tolerance: 1e-12,
            check_for_inf_nan: true,
        }
    }
}
