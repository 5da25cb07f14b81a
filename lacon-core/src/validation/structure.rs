//! Compressed storage structure validation
//!
//! A compressed layout is a pointer array of length `major + 1` and an
//! index array. The pointers start at zero, never decrease and end at the
//! index count. Indices within one major slice are strictly increasing
//! and below `minor`.

use crate::{LaError, Result};

/// Validate pointer/index arrays for a `major x minor` compressed layout
pub fn validate_compressed(
    pointers: &[usize],
    indices: &[usize],
    major: usize,
    minor: usize,
) -> Result<()> {
    if pointers.len() != major + 1 {
        return Err(LaError::shape_mismatch(format!(
            "pointer array has length {}, expected {}",
            pointers.len(),
            major + 1
        )));
    }
    if pointers[0] != 0 || pointers[major] != indices.len() {
        return Err(LaError::wrong_input(format!(
            "pointers must span 0..{}, got {}..{}",
            indices.len(),
            pointers[0],
            pointers[major]
        )));
    }
    for (outer, bounds) in pointers.windows(2).enumerate() {
        if bounds[0] > bounds[1] {
            return Err(LaError::wrong_input(format!(
                "pointers decrease at {outer}"
            )));
        }
        let slice = &indices[bounds[0]..bounds[1]];
        if slice.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(LaError::wrong_input(format!(
                "indices of {outer} are not strictly increasing"
            )));
        }
        if let Some(&last) = slice.last() {
            if last >= minor {
                return Err(LaError::shape_mismatch(format!(
                    "index {last} in {outer} exceeds dimension {minor}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    #[test]
    fn test_valid_structure() {
        assert!(validate_compressed(&[0, 2, 2, 3], &[0, 2, 1], 3, 3).is_ok());
        assert!(validate_compressed(&[0, 0], &[], 1, 5).is_ok());
    }

    #[test]
    fn test_invalid_structure() {
        let unsorted = validate_compressed(&[0, 2], &[1, 0], 1, 3).unwrap_err();
        assert_eq!(unsorted.category(), ErrorCategory::Input);

        let duplicate = validate_compressed(&[0, 2], &[1, 1], 1, 3).unwrap_err();
        assert_eq!(duplicate.category(), ErrorCategory::Input);

        let out_of_range = validate_compressed(&[0, 1], &[3], 1, 3).unwrap_err();
        assert_eq!(out_of_range.category(), ErrorCategory::Shape);

        assert!(validate_compressed(&[0, 1], &[0], 2, 3).is_err());
        assert!(validate_compressed(&[0, 2, 1], &[0, 1], 2, 3).is_err());
    }
}
