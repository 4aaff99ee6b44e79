//! Convex functions of affine expressions.
//!
//! A `Convex` value is `sign * f(affine_in) + offset` where `f` is one of the
//! closed set of functions in [`ConvexKind`]. Comparing it against an affine
//! expression yields a [`CvxConstr`], provided the comparison respects the
//! curvature (convex `<=`, concave `>=`).

use super::affine::{merge_models, Affine};
use super::shape::Shape;
use super::vars::ModelId;
use crate::constraints::CvxConstr;
use crate::error::{CvxError, Result};

/// The function applied by a convex expression or constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvexKind {
    /// Elementwise absolute value.
    Abs,
    /// 1-norm.
    Norm1,
    /// Infinity norm.
    NormInf,
    /// Euclidean norm.
    Norm2,
    /// Elementwise square.
    Square,
    /// Sum of squares.
    SumSquares,
    /// Elementwise exponential.
    Exp,
}

/// Which layer expands a convex kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Piecewise-linear; the linear model rewrites it into linear rows.
    Linear,
    /// Second-order cone representable; expanded into cone memberships.
    SecondOrder,
}

impl ConvexKind {
    /// The layer expanding this kind, `None` if no second-order cone model can.
    pub fn handler(self) -> Option<Handler> {
        match self {
            ConvexKind::Abs | ConvexKind::Norm1 | ConvexKind::NormInf => Some(Handler::Linear),
            ConvexKind::Norm2 | ConvexKind::Square | ConvexKind::SumSquares => {
                Some(Handler::SecondOrder)
            }
            ConvexKind::Exp => None,
        }
    }

    /// Whether `f` maps each element separately (output shaped like input).
    pub fn is_elementwise(self) -> bool {
        matches!(self, ConvexKind::Abs | ConvexKind::Square | ConvexKind::Exp)
    }

    /// Whether constraints of this kind keep the bound itself in `affine_out`.
    ///
    /// Squared kinds keep the negated bound instead, which is the orientation
    /// the rotated-cone expansion consumes.
    pub(crate) fn stores_bound(self) -> bool {
        !matches!(self, ConvexKind::Square | ConvexKind::SumSquares)
    }

    /// One-letter category tag.
    pub fn code(self) -> char {
        match self {
            ConvexKind::Abs => 'A',
            ConvexKind::Norm1 => 'M',
            ConvexKind::NormInf => 'I',
            ConvexKind::Norm2 => 'E',
            ConvexKind::Square => 'S',
            ConvexKind::SumSquares => 'Q',
            ConvexKind::Exp => 'X',
        }
    }
}

/// Norm degree accepted by [`norm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    One,
    Two,
    Inf,
}

/// `sign * f(affine_in) + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Convex {
    pub(crate) affine_in: Affine,
    pub(crate) offset: Affine,
    pub(crate) kind: ConvexKind,
    pub(crate) sign: f64,
}

impl Convex {
    fn new(affine_in: Affine, kind: ConvexKind) -> Self {
        let shape = if kind.is_elementwise() {
            *affine_in.shape()
        } else {
            Shape::scalar()
        };
        Convex {
            affine_in,
            offset: Affine::zeros(shape),
            kind,
            sign: 1.0,
        }
    }

    pub fn kind(&self) -> ConvexKind {
        self.kind
    }

    pub fn model(&self) -> Option<ModelId> {
        self.affine_in.model().or(self.offset.model())
    }

    pub fn shape(&self) -> &Shape {
        self.offset.shape()
    }

    /// `true` for `+f`, `false` for `-f`.
    pub fn is_convex(&self) -> bool {
        self.sign > 0.0
    }

    /// Negate.
    pub fn neg(&self) -> Convex {
        Convex {
            affine_in: self.affine_in.clone(),
            offset: self.offset.neg(),
            kind: self.kind,
            sign: -self.sign,
        }
    }

    /// Add an affine expression; it must not widen the expression's shape.
    pub fn add(&self, rhs: impl Into<Affine>) -> Result<Convex> {
        let offset = self.offset.add(rhs)?;
        if offset.size() != self.offset.size() {
            return Err(CvxError::ShapeMismatch {
                expected: self.offset.shape().to_string(),
                got: offset.shape().to_string(),
            });
        }
        merge_models(self.affine_in.model(), offset.model())?;
        let offset = Affine {
            shape: *self.offset.shape(),
            ..offset
        };
        Ok(Convex {
            offset,
            ..self.clone()
        })
    }

    /// Subtract an affine expression.
    pub fn sub(&self, rhs: impl Into<Affine>) -> Result<Convex> {
        self.add(rhs.into().neg())
    }

    /// Convex constraint `self <= rhs`; `self` must be convex.
    pub fn le(&self, rhs: impl Into<Affine>) -> Result<CvxConstr> {
        if !self.is_convex() {
            return Err(CvxError::NotConvex(format!(
                "concave {:?} expression on the left of <=",
                self.kind
            )));
        }
        CvxConstr::from_residual(self.affine_in.clone(), self.offset.sub(rhs)?, self.kind)
    }

    /// Convex constraint `self >= rhs`; `self` must be concave.
    pub fn ge(&self, rhs: impl Into<Affine>) -> Result<CvxConstr> {
        if self.is_convex() {
            return Err(CvxError::NotConvex(format!(
                "convex {:?} expression on the left of >=",
                self.kind
            )));
        }
        self.neg().le(rhs.into().neg())
    }
}

/// Elementwise `|x|`.
pub fn abs(x: impl Into<Affine>) -> Convex {
    Convex::new(x.into(), ConvexKind::Abs)
}

/// `||x||_1`, `||x||_2` or `||x||_inf`.
pub fn norm(x: impl Into<Affine>, degree: Degree) -> Convex {
    let kind = match degree {
        Degree::One => ConvexKind::Norm1,
        Degree::Two => ConvexKind::Norm2,
        Degree::Inf => ConvexKind::NormInf,
    };
    Convex::new(x.into(), kind)
}

/// Elementwise `x^2`.
pub fn square(x: impl Into<Affine>) -> Convex {
    Convex::new(x.into(), ConvexKind::Square)
}

/// `sum(x^2)`.
pub fn sumsqr(x: impl Into<Affine>) -> Convex {
    Convex::new(x.into(), ConvexKind::SumSquares)
}

/// Elementwise `exp(x)`.
pub fn exp(x: impl Into<Affine>) -> Convex {
    Convex::new(x.into(), ConvexKind::Exp)
}
