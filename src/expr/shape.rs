//! Shapes of variable blocks and expressions.
//!
//! Elements are laid out row-major, so a block of shape `(m, n)` occupies
//! `m * n` consecutive columns of the model.

use std::fmt;

/// Shape of a variable block or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vector(usize),
    Matrix(usize, usize),
}

impl Shape {
    pub fn scalar() -> Self {
        Shape::Scalar
    }

    pub fn vector(n: usize) -> Self {
        Shape::Vector(n)
    }

    pub fn matrix(m: usize, n: usize) -> Self {
        Shape::Matrix(m, n)
    }

    /// Number of model columns the shape spans.
    pub fn size(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Scalar)
    }

    pub fn rows(&self) -> usize {
        match *self {
            Shape::Scalar => 1,
            Shape::Vector(n) | Shape::Matrix(n, _) => n,
        }
    }

    pub fn cols(&self) -> usize {
        match *self {
            Shape::Matrix(_, n) => n,
            _ => 1,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Shape::Scalar => 0,
            Shape::Vector(_) => 1,
            Shape::Matrix(..) => 2,
        }
    }

    /// Result shape of an elementwise operation.
    ///
    /// Operands of equal size combine elementwise; a single-element operand
    /// is broadcast to the other. The shape of the larger operand wins.
    pub fn elementwise(&self, other: &Shape) -> Option<Shape> {
        match (self.size(), other.size()) {
            (a, b) if a == b => Some(if self.rank() >= other.rank() { *self } else { *other }),
            (_, 1) => Some(*self),
            (1, _) => Some(*other),
            _ => None,
        }
    }

    /// Shape of `A @ x` for a constant `rows x cols` matrix `A`, or `None`
    /// when `x` is a scalar or its leading dimension differs from `cols`.
    pub fn left_product(&self, rows: usize, cols: usize) -> Option<Shape> {
        match *self {
            Shape::Vector(n) if n == cols => Some(Shape::Vector(rows)),
            Shape::Matrix(m, n) if m == cols => Some(Shape::Matrix(rows, n)),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "()"),
            Shape::Vector(n) => write!(f, "({},)", n),
            Shape::Matrix(m, n) => write!(f, "({}, {})", m, n),
        }
    }
}

impl From<()> for Shape {
    fn from(_: ()) -> Self {
        Shape::Scalar
    }
}

impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape::Vector(n)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((m, n): (usize, usize)) -> Self {
        Shape::Matrix(m, n)
    }
}
