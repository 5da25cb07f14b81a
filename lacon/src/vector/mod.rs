//! Dense and sparse vectors

pub mod dense;
pub mod sparse;

pub use dense::DenseVector;
pub use sparse::SparseVector;
