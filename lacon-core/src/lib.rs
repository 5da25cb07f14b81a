//! Lacon Core - container contracts for copy-on-write linear algebra
//!
//! This crate provides the pieces every dense and sparse container shares:
//! the sparsity pattern, the scalar abstraction, the container traits and
//! the error type. It holds no storage or locking of its own; concrete
//! containers live in the `lacon` crate.

pub mod error;
pub mod float_cmp;
pub mod pattern;
pub mod traits;
pub mod validation;

#[cfg(feature = "nalgebra")]
mod adapters;

pub use error::*;
pub use pattern::SparsityPattern;
pub use traits::*;
