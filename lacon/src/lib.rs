//! Lacon - copy-on-write dense and sparse linear algebra containers
//!
//! This library provides vectors and matrices whose copies are O(1) until
//! one of them is written, with compressed sparse matrices (CSR and CSC)
//! that support concurrent writes to disjoint rows or columns.
//!
//! ## Architecture
//!
//! Lacon follows a contract/implementation split:
//!
//! - **lacon-core**: Container traits, sparsity patterns, scalar types,
//!   errors and validation (no storage, no locking)
//! - **lacon**: Concrete containers, lock buckets, products and the eigen
//!   solver dispatch
//!
//! ## Quick Start
//!
//! ```rust
//! use lacon::{CsrMatrix, Matrix, SparseMatrixOptions, SparsityPattern};
//!
//! fn example() -> lacon::Result<()> {
//!     let pattern = SparsityPattern::diagonal(3);
//!     let mut matrix = CsrMatrix::from_pattern(3, 3, &pattern, &SparseMatrixOptions::default())?;
//!     for i in 0..3 {
//!         matrix.set_entry(i, i, 2.0 + i as f64)?;
//!     }
//!
//!     // cheap copy; the first write to `scaled` detaches it
//!     let mut scaled = matrix.clone();
//!     lacon::Container::scal(&mut scaled, 2.0);
//!
//!     assert_eq!(matrix.mv(&[1.0, 1.0, 1.0])?, vec![2.0, 3.0, 4.0]);
//!     assert_eq!(scaled.mv(&[1.0, 1.0, 1.0])?, vec![4.0, 6.0, 8.0]);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Copy-on-write**: `Clone` shares storage; mutation clones on demand
//! - **Closed sparsity patterns**: writes outside the pattern are errors
//! - **Lock buckets**: [`ConcurrentWriter`] for multi-threaded assembly
//! - **Products**: matrix-vector, transposed and right-multiplication
//! - **Eigen solvers**: Schur and symmetric backends on nalgebra

// Re-export core abstractions
pub use lacon_core::{
    // Container traits
    Backend, Container, Matrix, Vector,
    // Operand abstractions
    MatrixLike, VectorLike, Scalar,
    // Patterns
    SparsityPattern,
    // Error handling
    ErrorCategory, LaError, Result,
};
pub use lacon_core::float_cmp;

// Implementation modules
pub mod config;
pub mod eigen_solver;
pub mod locking;
pub mod matrix;
pub mod vector;

// Public exports
pub use config::{EigenSolverOptions, EigenSolverType, SparseMatrixOptions};
pub use eigen_solver::{EigenBackend, EigenSolver};
pub use locking::MutexPool;
pub use matrix::{
    ConcurrentWriter, Csc, CscMatrix, Csr, CsrMatrix, DenseMatrix, Layout, SparseFormat,
    SparseMatrix,
};
pub use vector::{DenseVector, SparseVector};
