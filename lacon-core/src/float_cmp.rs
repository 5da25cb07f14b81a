//! Floating-point comparison with a combined absolute/relative tolerance
//!
//! Two values compare equal when their distance is within `epsilon` either
//! absolutely or relative to the larger magnitude. Comparing against zero
//! therefore reduces to `|value| <= epsilon`.

use crate::Scalar;

/// Default tolerance for `f64` and `Complex<f64>`
pub const DEFAULT_F64_EPSILON: f64 = 1e-15;

/// Default tolerance for `f32`
pub const DEFAULT_F32_EPSILON: f64 = 1e-6;

/// Check whether two values are equal within `epsilon`
pub fn eq<S: Scalar>(first: S, second: S, epsilon: f64) -> bool {
    let distance = (first - second).magnitude();
    distance <= epsilon || distance <= epsilon * first.magnitude().max(second.magnitude())
}

/// Check whether two values differ by more than `epsilon`
///
/// NaN is never equal to anything, so it is always "not equal".
pub fn ne<S: Scalar>(first: S, second: S, epsilon: f64) -> bool {
    !eq(first, second, epsilon)
}

/// Check whether a value is distinguishable from zero
pub fn is_nonzero<S: Scalar>(value: S, epsilon: f64) -> bool {
    ne(value, S::zero(), epsilon)
}

/// [`is_nonzero`] with the scalar type's default tolerance
pub fn is_nonzero_default<S: Scalar>(value: S) -> bool {
    is_nonzero(value, S::default_epsilon())
}
