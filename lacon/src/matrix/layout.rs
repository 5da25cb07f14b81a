//! Compressed storage orientation
//!
//! A sparse matrix stores its entries grouped by a *major* index (rows for
//! CSR, columns for CSC) and sorted by the *minor* index inside each group.
//! [`Layout`] maps between `(row, col)` coordinates and that orientation.

use std::fmt::Debug;

/// Storage format tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SparseFormat {
    Csr,
    Csc,
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Csr {}
    impl Sealed for super::Csc {}
}

/// Orientation of a compressed sparse matrix
pub trait Layout: sealed::Sealed + Debug + Clone + Copy + Default + Send + Sync + 'static {
    const FORMAT: SparseFormat;

    /// `(row, col)` to `(major, minor)`
    fn split(row: usize, col: usize) -> (usize, usize);

    /// `(major, minor)` to `(row, col)`
    fn join(major: usize, minor: usize) -> (usize, usize);

    fn major_len(rows: usize, cols: usize) -> usize {
        Self::split(rows, cols).0
    }

    fn minor_len(rows: usize, cols: usize) -> usize {
        Self::split(rows, cols).1
    }
}

/// Row-major compressed storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Csr;

/// Column-major compressed storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Csc;

impl Layout for Csr {
    const FORMAT: SparseFormat = SparseFormat::Csr;

    fn split(row: usize, col: usize) -> (usize, usize) {
        (row, col)
    }

    fn join(major: usize, minor: usize) -> (usize, usize) {
        (major, minor)
    }
}

impl Layout for Csc {
    const FORMAT: SparseFormat = SparseFormat::Csc;

    fn split(row: usize, col: usize) -> (usize, usize) {
        (col, row)
    }

    fn join(major: usize, minor: usize) -> (usize, usize) {
        (minor, major)
    }
}
