//! Index and dimension checks
//!
//! Every check returns the error kind the container contract prescribes:
//! out-of-range coordinates are `IndexOutOfRange`, disagreeing dimensions
//! are `ShapeMismatch`.

use crate::{LaError, Result};

/// Validate that `index` addresses one of `len` slots
pub fn check_index(index: usize, len: usize, what: &str) -> Result<()> {
    if index >= len {
        return Err(LaError::index_out_of_range(format!(
            "{what} {index} is not below {len}"
        )));
    }
    Ok(())
}

/// Validate that an operand has the expected length
pub fn check_len(actual: usize, expected: usize, what: &str) -> Result<()> {
    if actual != expected {
        return Err(LaError::shape_mismatch(format!(
            "{what} has length {actual}, expected {expected}"
        )));
    }
    Ok(())
}

/// Validate that two `(rows, cols)` shapes agree
pub fn check_same_shape(lhs: (usize, usize), rhs: (usize, usize)) -> Result<()> {
    if lhs != rhs {
        return Err(LaError::shape_mismatch(format!(
            "{}x{} vs {}x{}",
            lhs.0, lhs.1, rhs.0, rhs.1
        )));
    }
    Ok(())
}
