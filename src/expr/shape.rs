//! Shape representation for expressions.
//!
//! Every expression is two-dimensional:
//! - `(1, 1)` is a scalar
//! - `(n, 1)` is a column vector of length n
//! - `(m, n)` is an m x n matrix

use std::fmt;

use crate::error::{CvxError, Result};

/// Shape of an expression as `(rows, cols)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Create a scalar shape.
    pub fn scalar() -> Self {
        Shape { rows: 1, cols: 1 }
    }

    /// Create a column vector shape.
    pub fn vector(n: usize) -> Self {
        Shape { rows: n, cols: 1 }
    }

    /// Create a matrix shape.
    pub fn matrix(m: usize, n: usize) -> Self {
        Shape { rows: m, cols: n }
    }

    /// Create a shape, rejecting empty dimensions.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Shape::matrix(rows, cols).checked()
    }

    /// This shape, or an error if either dimension is zero.
    pub fn checked(self) -> Result<Self> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CvxError::InvalidValue(format!(
                "shape {self} has an empty dimension"
            )));
        }
        Ok(self)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// Check if this is a scalar.
    pub fn is_scalar(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    /// Shape as a `(rows, cols)` tuple.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Result shape of an elementwise operation.
    ///
    /// Equal shapes combine as-is; a scalar broadcasts against anything.
    pub fn broadcast(&self, other: &Shape) -> Option<Shape> {
        if self == other || other.is_scalar() {
            Some(*self)
        } else if self.is_scalar() {
            Some(*other)
        } else {
            None
        }
    }

    /// Result shape of a product.
    ///
    /// A scalar factor scales the other operand; otherwise the inner
    /// dimensions must agree.
    pub fn product(&self, other: &Shape) -> Option<Shape> {
        if self.is_scalar() {
            Some(*other)
        } else if other.is_scalar() {
            Some(*self)
        } else if self.cols == other.rows {
            Some(Shape::matrix(self.rows, other.cols))
        } else {
            None
        }
    }

    /// Like [`Shape::broadcast`], failing with a dimension error.
    pub fn elementwise(&self, other: &Shape) -> Result<Shape> {
        self.broadcast(other)
            .ok_or(CvxError::IncompatibleDimensions {
                lhs: *self,
                rhs: *other,
            })
    }

    /// Like [`Shape::product`], failing with a dimension error.
    pub fn multiply(&self, other: &Shape) -> Result<Shape> {
        self.product(other)
            .ok_or(CvxError::IncompatibleDimensions {
                lhs: *self,
                rhs: *other,
            })
    }

    /// Check that `(row, col)` addresses an element of this shape.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Column-major flat offset of element `(row, col)`.
    pub fn offset(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::scalar()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({}, {})", self.rows, self.cols)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

impl PartialEq<(usize, usize)> for Shape {
    fn eq(&self, other: &(usize, usize)) -> bool {
        self.dims() == *other
    }
}

// Conversion traits
impl From<()> for Shape {
    fn from(_: ()) -> Self {
        Shape::scalar()
    }
}

impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape::vector(n)
    }
}

impl From<(usize,)> for Shape {
    fn from((n,): (usize,)) -> Self {
        Shape::vector(n)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((m, n): (usize, usize)) -> Self {
        Shape::matrix(m, n)
    }
}
