//! Index, shape and structure validation for containers
//!
//! This module contains pure validation functions with no storage of
//! their own. Containers call them before touching their arrays.

pub mod bounds;
pub mod conversion;
pub mod structure;

pub use bounds::{check_index, check_len, check_same_shape};
pub use conversion::{nonzero_size, size_from_isize};
pub use structure::validate_compressed;
