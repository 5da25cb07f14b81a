//! Abstract interfaces for dense and sparse containers
//!
//! This module defines the capability set every container implements and
//! the read-only abstractions used to accept foreign operands.

pub mod abstraction;
pub mod container;
pub mod scalar;

pub use abstraction::{MatrixLike, VectorLike};
pub use container::{Backend, Container, Matrix, Vector};
pub use scalar::Scalar;
