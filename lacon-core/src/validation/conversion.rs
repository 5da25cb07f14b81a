//! Size conversions at construction time

use crate::{LaError, Result};

/// Convert a signed size coming from a binding layer into a `usize`
///
/// Negative values are rejected with `WrongInputGiven`.
pub fn size_from_isize(value: isize) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| LaError::wrong_input(format!("size {value} must not be negative")))
}

/// Reject degenerate (zero) sizes
pub fn nonzero_size(value: usize, what: &str) -> Result<usize> {
    if value == 0 {
        return Err(LaError::wrong_input(format!("{what} must be positive")));
    }
    Ok(value)
}
