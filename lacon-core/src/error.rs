//! Error types for container operations

use thiserror::Error;

/// Coarse classification of a [`LaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Dimensions or structure of the operands disagree
    Shape,
    /// A coordinate lies outside the container or its pattern
    Index,
    /// A numeric backend did not converge
    Numeric,
    /// Malformed input at construction time
    Input,
}

/// Errors that can occur during container operations
///
/// Every error is raised at the call that detects it; nothing is retried
/// or deferred internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaError {
    /// Operand dimensions disagree
    #[error("shapes do not match: {0}")]
    ShapeMismatch(String),
    /// Coordinate access outside the container or its sparsity pattern
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),
    /// Two sparse operands of equal shape have different sparsity patterns
    #[error("sparsity patterns do not match: {0}")]
    PatternMismatch(String),
    /// The eigenvalue backend reported a failure
    #[error("eigen solver failed: {0}")]
    EigenSolverFailed(String),
    /// Malformed configuration or size conversion
    #[error("wrong input given: {0}")]
    WrongInputGiven(String),
}

impl LaError {
    /// Get the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            LaError::ShapeMismatch(_) | LaError::PatternMismatch(_) => ErrorCategory::Shape,
            LaError::IndexOutOfRange(_) => ErrorCategory::Index,
            LaError::EigenSolverFailed(_) => ErrorCategory::Numeric,
            LaError::WrongInputGiven(_) => ErrorCategory::Input,
        }
    }

    pub fn shape_mismatch(context: impl Into<String>) -> Self {
        LaError::ShapeMismatch(context.into())
    }

    pub fn index_out_of_range(context: impl Into<String>) -> Self {
        LaError::IndexOutOfRange(context.into())
    }

    pub fn pattern_mismatch(context: impl Into<String>) -> Self {
        LaError::PatternMismatch(context.into())
    }

    pub fn eigen_solver_failed(context: impl Into<String>) -> Self {
        LaError::EigenSolverFailed(context.into())
    }

    pub fn wrong_input(context: impl Into<String>) -> Self {
        LaError::WrongInputGiven(context.into())
    }
}

/// Result type for container operations
pub type Result<T> = core::result::Result<T, LaError>;
