//! Concurrent writes into one sparse matrix
//!
//! [`ConcurrentWriter`] borrows a matrix mutably, makes its storage unique
//! once, and then hands out `&self` write methods that many threads can
//! call at the same time. Each write locks the bucket of its major index
//! (row for CSR, column for CSC), so writers on different buckets never
//! wait for each other while writers on the same bucket serialize.

use std::marker::PhantomData;
use std::sync::Arc;

use lacon_core::validation::check_index;
use lacon_core::{LaError, Result, Scalar};
use tracing::trace;

use super::layout::Layout;
use super::sparse::SparseMatrix;
use crate::locking::MutexPool;

/// Shared write handle over a uniquely owned sparse matrix
pub struct ConcurrentWriter<'a, S, L: Layout> {
    entries: *mut S,
    pointers: &'a [usize],
    indices: &'a [usize],
    locks: &'a MutexPool,
    rows: usize,
    cols: usize,
    _marker: PhantomData<(&'a mut [S], L)>,
}

// Every entry slot belongs to exactly one major index, and every access to
// a slot happens under that major index's bucket lock.
unsafe impl<S: Send, L: Layout> Send for ConcurrentWriter<'_, S, L> {}
unsafe impl<S: Send, L: Layout> Sync for ConcurrentWriter<'_, S, L> {}

impl<S: Scalar, L: Layout> SparseMatrix<S, L> {
    /// Writer that lets several threads update entries concurrently
    pub fn concurrent_writer(&mut self) -> ConcurrentWriter<'_, S, L> {
        self.ensure_unique();
        let (rows, cols) = (self.rows, self.cols);
        let locks = &*self.locks;
        let storage = Arc::make_mut(&mut self.storage);
        ConcurrentWriter {
            entries: storage.entries.as_mut_ptr(),
            pointers: &storage.pointers,
            indices: &storage.indices,
            locks,
            rows,
            cols,
            _marker: PhantomData,
        }
    }
}

impl<S: Scalar, L: Layout> ConcurrentWriter<'_, S, L> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(major, slot)` of a stored coordinate
    fn locate(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        check_index(row, self.rows, "row")?;
        check_index(col, self.cols, "column")?;
        let (major, minor) = L::split(row, col);
        let start = self.pointers[major];
        let end = self.pointers[major + 1];
        let offset = self.indices[start..end].binary_search(&minor).map_err(|_| {
            LaError::index_out_of_range(format!("entry ({row}, {col}) is not in the pattern"))
        })?;
        Ok((major, start + offset))
    }

    /// Add `value` to a stored entry
    pub fn add_to_entry(&self, row: usize, col: usize, value: S) -> Result<()> {
        let (major, slot) = self.locate(row, col)?;
        let _guard = self.locks.lock(major);
        trace!(row, col, bucket = self.locks.bucket(major), "concurrent add");
        // SAFETY: `slot` is in bounds and owned by `major`, whose bucket is locked.
        unsafe { *self.entries.add(slot) += value };
        Ok(())
    }

    /// Overwrite a stored entry
    pub fn set_entry(&self, row: usize, col: usize, value: S) -> Result<()> {
        let (major, slot) = self.locate(row, col)?;
        let _guard = self.locks.lock(major);
        trace!(row, col, bucket = self.locks.bucket(major), "concurrent set");
        // SAFETY: as in `add_to_entry`.
        unsafe { *self.entries.add(slot) = value };
        Ok(())
    }

    /// Read an entry; zero if it is not stored
    pub fn get_entry(&self, row: usize, col: usize) -> Result<S> {
        match self.locate(row, col) {
            Ok((major, slot)) => {
                let _guard = self.locks.lock(major);
                // SAFETY: as in `add_to_entry`.
                Ok(unsafe { *self.entries.add(slot) })
            }
            Err(LaError::IndexOutOfRange(_)) if row < self.rows && col < self.cols => Ok(S::zero()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SparseMatrixOptions;
    use crate::matrix::sparse::{CscMatrix, CsrMatrix};
    use lacon_core::{Matrix, SparsityPattern};

    #[test]
    fn test_writer_threads_on_disjoint_rows() {
        let options = SparseMatrixOptions::default().with_num_mutexes(4);
        let mut m = CsrMatrix::<f64>::from_pattern(8, 8, &SparsityPattern::dense(8, 8), &options)
            .unwrap();
        let shared = m.clone();
        {
            let writer = m.concurrent_writer();
            std::thread::scope(|scope| {
                for thread in 0..4 {
                    let writer = &writer;
                    scope.spawn(move || {
                        for row in (thread..8).step_by(4) {
                            for col in 0..8 {
                                writer.add_to_entry(row, col, 1.0).unwrap();
                                writer.add_to_entry(row, col, 0.5).unwrap();
                            }
                        }
                    });
                }
            });
        }
        assert!(m.entries().iter().all(|&v| v == 1.5));
        assert!(shared.entries().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_writer_same_bucket_serializes() {
        let mut m = CscMatrix::<f64>::from_dense_value(2, 2, 0.0, &Default::default()).unwrap();
        {
            let writer = m.concurrent_writer();
            std::thread::scope(|scope| {
                for _ in 0..8 {
                    scope.spawn(|| {
                        for _ in 0..100 {
                            writer.add_to_entry(1, 0, 1.0).unwrap();
                        }
                    });
                }
            });
            assert_eq!(writer.get_entry(1, 0).unwrap(), 800.0);
        }
        assert_eq!(m.get_entry(1, 0).unwrap(), 800.0);
    }

    #[test]
    fn test_writer_respects_pattern() {
        let mut m =
            CsrMatrix::<f64>::from_pattern(3, 3, &SparsityPattern::diagonal(3), &Default::default())
                .unwrap();
        let writer = m.concurrent_writer();
        writer.set_entry(1, 1, 2.0).unwrap();
        assert!(matches!(
            writer.set_entry(0, 1, 1.0),
            Err(LaError::IndexOutOfRange(_))
        ));
        assert_eq!(writer.get_entry(0, 1).unwrap(), 0.0);
        assert!(writer.get_entry(3, 0).is_err());
        assert_eq!(writer.get_entry(1, 1).unwrap(), 2.0);
        assert_eq!((writer.rows(), writer.cols()), (3, 3));
    }
}
