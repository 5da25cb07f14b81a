//! Element type constraints for containers
//!
//! This module defines the trait that constrains what types can be
//! stored as container elements.

use core::fmt::Debug;
use core::ops::{AddAssign, MulAssign, Neg, SubAssign};

use num_complex::Complex;
use num_traits::Num;

/// Trait for types that can be stored as container elements
///
/// All element types must be:
/// - Copy: Can be copied without allocation
/// - Send + Sync: Can be shared between worker threads
/// - Num: Closed under the field operations used by the containers
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Num
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Absolute value (modulus for complex numbers)
    fn magnitude(self) -> f64;

    /// False for NaN and infinite values (in any component)
    fn is_finite_value(self) -> bool;

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self;

    /// Library-wide default tolerance for comparisons of this type
    fn default_epsilon() -> f64;
}

impl Scalar for f64 {
    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn is_finite_value(self) -> bool {
        self.is_finite()
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn default_epsilon() -> f64 {
        crate::float_cmp::DEFAULT_F64_EPSILON
    }
}

impl Scalar for f32 {
    fn magnitude(self) -> f64 {
        self.abs() as f64
    }

    fn is_finite_value(self) -> bool {
        self.is_finite()
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn default_epsilon() -> f64 {
        crate::float_cmp::DEFAULT_F32_EPSILON
    }
}

impl Scalar for Complex<f64> {
    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn is_finite_value(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    fn from_f64(value: f64) -> Self {
        Complex::new(value, 0.0)
    }

    fn default_epsilon() -> f64 {
        crate::float_cmp::DEFAULT_F64_EPSILON
    }
}
