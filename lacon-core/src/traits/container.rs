//! Container capability traits
//!
//! [`Container`] is the operation set every vector and matrix shares.
//! `Clone` on a container is the cheap sharing copy; [`Container::copy`]
//! always returns an independent deep copy. Mutating operations take
//! `&mut self` and perform copy-on-write internally.

use num_traits::{One, Zero};

use crate::float_cmp;
use crate::validation::{check_index, check_len};
use crate::{Result, Scalar, SparsityPattern, VectorLike};

/// Storage family of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Backend {
    CommonDense,
    CommonSparse,
}

/// Operations shared by all vectors and matrices
pub trait Container: Clone {
    /// Element type
    type Element: Scalar;

    /// Storage family of this container type
    const BACKEND: Backend;

    /// Independent deep copy
    fn copy(&self) -> Self;

    /// Multiply every element by `alpha`
    fn scal(&mut self, alpha: Self::Element);

    /// `self += alpha * x`
    ///
    /// Fails with `ShapeMismatch` if the shapes differ.
    fn axpy(&mut self, alpha: Self::Element, x: &Self) -> Result<()>;

    /// Structural equality of dimensions, ignoring values
    fn has_equal_shape(&self, other: &Self) -> bool;

    fn backend(&self) -> Backend {
        Self::BACKEND
    }

    /// `self + other` as a fresh container
    fn add(&self, other: &Self) -> Result<Self> {
        let mut result = self.copy();
        result.iadd(other)?;
        Ok(result)
    }

    /// `self - other` as a fresh container
    fn sub(&self, other: &Self) -> Result<Self> {
        let mut result = self.copy();
        result.isub(other)?;
        Ok(result)
    }

    /// `self += other`
    fn iadd(&mut self, other: &Self) -> Result<()> {
        self.axpy(Self::Element::one(), other)
    }

    /// `self -= other`
    fn isub(&mut self, other: &Self) -> Result<()> {
        self.axpy(-Self::Element::one(), other)
    }
}

/// Fixed-size indexable vectors
pub trait Vector: Container {
    /// Number of elements
    fn size(&self) -> usize;

    /// Value at `index`; zero for unstored entries of sparse vectors
    fn get_entry(&self, index: usize) -> Result<Self::Element>;

    fn set_entry(&mut self, index: usize, value: Self::Element) -> Result<()>;

    fn add_to_entry(&mut self, index: usize, value: Self::Element) -> Result<()>;

    /// Stored entries in ascending index order
    ///
    /// Dense vectors yield every element.
    fn stored_entries(&self) -> impl Iterator<Item = (usize, Self::Element)> + '_;

    /// Sum of elementwise products
    fn dot(&self, other: &Self) -> Result<Self::Element> {
        check_len(other.size(), self.size(), "dot operand")?;
        let mut sum = Self::Element::zero();
        for (index, value) in self.stored_entries() {
            sum += value * other.get_entry(index)?;
        }
        Ok(sum)
    }

    fn l1_norm(&self) -> f64 {
        self.stored_entries().map(|(_, v)| v.magnitude()).sum()
    }

    fn l2_norm(&self) -> f64 {
        self.stored_entries()
            .map(|(_, v)| v.magnitude() * v.magnitude())
            .sum::<f64>()
            .sqrt()
    }

    fn sup_norm(&self) -> f64 {
        self.amax().1
    }

    /// Index of the first entry with maximal magnitude, and that magnitude
    ///
    /// A vector without nonzero entries yields `(0, 0.0)`.
    fn amax(&self) -> (usize, f64) {
        let mut best = (0, 0.0);
        for (index, value) in self.stored_entries() {
            let magnitude = value.magnitude();
            if magnitude > best.1 {
                best = (index, magnitude);
            }
        }
        best
    }

    /// Elementwise comparison under `epsilon`
    fn almost_equal(&self, other: &Self, epsilon: f64) -> Result<bool> {
        check_len(other.size(), self.size(), "comparison operand")?;
        for index in 0..self.size() {
            if float_cmp::ne(self.get_entry(index)?, other.get_entry(index)?, epsilon) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn mean(&self) -> Self::Element {
        let mut sum = Self::Element::zero();
        for (_, value) in self.stored_entries() {
            sum += value;
        }
        sum / Self::Element::from_f64(self.size() as f64)
    }
}

/// Two-dimensional containers
pub trait Matrix: Container {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Value at `(row, col)`; zero for unstored coordinates
    ///
    /// Fails only if the coordinate lies outside the matrix.
    fn get_entry(&self, row: usize, col: usize) -> Result<Self::Element>;

    fn set_entry(&mut self, row: usize, col: usize, value: Self::Element) -> Result<()>;

    fn add_to_entry(&mut self, row: usize, col: usize, value: Self::Element) -> Result<()>;

    /// Zero every stored entry of `row`, keeping the structure
    fn clear_row(&mut self, row: usize) -> Result<()>;

    /// Zero every stored entry of `col`, keeping the structure
    fn clear_col(&mut self, col: usize) -> Result<()>;

    /// Number of stored entries
    fn non_zeros(&self) -> usize;

    /// Stored entries as `(row, col, value)` in storage order
    fn stored_entries(&self) -> impl Iterator<Item = (usize, usize, Self::Element)> + '_;

    /// `y = A * x`
    fn mv_into<X>(&self, x: &X, y: &mut [Self::Element]) -> Result<()>
    where
        X: VectorLike<Self::Element> + ?Sized;

    /// `y = A^T * x`
    fn mtv_into<X>(&self, x: &X, y: &mut [Self::Element]) -> Result<()>
    where
        X: VectorLike<Self::Element> + ?Sized;

    /// Clear `row` and put a one on its diagonal
    fn unit_row(&mut self, row: usize) -> Result<()> {
        check_index(row, self.cols(), "diagonal column")?;
        self.clear_row(row)?;
        self.set_entry(row, row, Self::Element::one())
    }

    /// Clear `col` and put a one on its diagonal
    fn unit_col(&mut self, col: usize) -> Result<()> {
        check_index(col, self.rows(), "diagonal row")?;
        self.clear_col(col)?;
        self.set_entry(col, col, Self::Element::one())
    }

    /// False if any stored entry is NaN or infinite
    fn valid(&self) -> bool {
        self.stored_entries().all(|(_, _, v)| v.is_finite_value())
    }

    /// Largest stored magnitude
    fn sup_norm(&self) -> f64 {
        self.stored_entries()
            .map(|(_, _, v)| v.magnitude())
            .fold(0.0, f64::max)
    }

    /// Row-wise pattern of the stored entries
    ///
    /// With `prune` set, entries indistinguishable from zero under
    /// `epsilon` are left out.
    fn pattern(&self, prune: bool, epsilon: f64) -> SparsityPattern {
        let mut rows = vec![Vec::new(); self.rows()];
        for (row, col, value) in self.stored_entries() {
            if !prune || float_cmp::is_nonzero(value, epsilon) {
                rows[row].push(col);
            }
        }
        let mut pattern = SparsityPattern::from_rows(rows);
        pattern.sort();
        pattern
    }

    /// `A * x` as a fresh dense vector
    fn mv<X>(&self, x: &X) -> Result<Vec<Self::Element>>
    where
        X: VectorLike<Self::Element> + ?Sized,
    {
        let mut y = vec![Self::Element::zero(); self.rows()];
        self.mv_into(x, &mut y)?;
        Ok(y)
    }

    /// `A^T * x` as a fresh dense vector
    fn mtv<X>(&self, x: &X) -> Result<Vec<Self::Element>>
    where
        X: VectorLike<Self::Element> + ?Sized,
    {
        let mut y = vec![Self::Element::zero(); self.cols()];
        self.mtv_into(x, &mut y)?;
        Ok(y)
    }
}

/// Check operand lengths for `y = A * x` (or the transpose)
pub fn check_product_dims(
    x_len: usize,
    y_len: usize,
    expected_x: usize,
    expected_y: usize,
) -> Result<()> {
    check_len(x_len, expected_x, "input vector")?;
    check_len(y_len, expected_y, "output vector")
}
