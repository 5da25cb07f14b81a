//! Dense and compressed sparse matrices

pub mod concurrent;
pub mod dense;
pub mod layout;
pub mod product;
pub mod sparse;

pub use concurrent::ConcurrentWriter;
pub use dense::DenseMatrix;
pub use layout::{Csc, Csr, Layout, SparseFormat};
pub use sparse::{CscMatrix, CsrMatrix, SparseMatrix, PARALLEL_MV_MIN_ROWS};
