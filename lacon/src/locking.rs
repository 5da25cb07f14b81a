//! Lock buckets for sparse matrices
//!
//! A [`MutexPool`] holds N mutexes. A row (CSR) or column (CSC) maps to
//! bucket `index % N`, so writers on different buckets proceed in
//! parallel. Bucket zero doubles as the lock taken while a shared matrix
//! is made unique.

use std::fmt;

use parking_lot::{Mutex, MutexGuard};

use lacon_core::validation::nonzero_size;
use lacon_core::Result;

/// Fixed-size array of unit mutexes
pub struct MutexPool {
    mutexes: Box<[Mutex<()>]>,
}

/// Guard holding every mutex of a pool
pub struct PoolGuard<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl MutexPool {
    /// Create a pool with `count` buckets; zero is rejected
    pub fn new(count: usize) -> Result<Self> {
        nonzero_size(count, "number of mutexes")?;
        Ok(Self::with_len(count))
    }

    fn with_len(count: usize) -> Self {
        Self {
            mutexes: (0..count.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    /// A fresh, unlocked pool of the same size
    pub fn fresh(&self) -> Self {
        Self::with_len(self.len())
    }

    pub fn len(&self) -> usize {
        self.mutexes.len()
    }

    /// Always false; a pool has at least one bucket
    pub fn is_empty(&self) -> bool {
        self.mutexes.is_empty()
    }

    /// Bucket guarding `index`
    pub fn bucket(&self, index: usize) -> usize {
        index % self.mutexes.len()
    }

    /// Lock the bucket guarding `index`
    pub fn lock(&self, index: usize) -> MutexGuard<'_, ()> {
        self.mutexes[self.bucket(index)].lock()
    }

    /// Lock taken while cloning shared storage
    pub fn lock_uniqueness(&self) -> MutexGuard<'_, ()> {
        self.mutexes[0].lock()
    }

    /// Lock every bucket in ascending order
    pub fn lock_all(&self) -> PoolGuard<'_> {
        PoolGuard {
            _guards: self.mutexes.iter().map(Mutex::lock).collect(),
        }
    }
}

impl fmt::Debug for MutexPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexPool")
            .field("len", &self.mutexes.len())
            .finish()
    }
}
