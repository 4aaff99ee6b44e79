//! Constraint types accepted by the models.
//!
//! - `LinConstr`: `A x (<= | ==) b`
//! - `Bounds`: per-column upper or lower bounds
//! - `CvxConstr`: a convex function of an affine expression against a bound
//! - `ConeConstr`: `||x[vector]||_2 <= x[apex]` over existing columns
//! - `ExpConeConstr`: `(x, y, z)` in the exponential cone

use std::fmt;

use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;

use crate::error::{CvxError, Result};
use crate::expr::affine::merge_models;
use crate::expr::{Affine, ConvexKind, ModelId, VarSub, Vars};

/// Row sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    /// `a'x <= b`
    Le,
    /// `a'x == b`
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Eq => write!(f, "=="),
        }
    }
}

/// Linear constraint block `linear * x (sense) constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinConstr {
    pub(crate) model: Option<ModelId>,
    pub(crate) linear: CscMatrix<f64>,
    pub(crate) constant: DVector<f64>,
    pub(crate) sense: Sense,
}

impl LinConstr {
    /// `residual (sense) 0`, i.e. `A x (sense) -b` for `residual = A x + b`.
    pub(crate) fn from_residual(residual: Affine, sense: Sense) -> Self {
        LinConstr {
            model: residual.model,
            linear: residual.linear,
            constant: -residual.constant,
            sense,
        }
    }

    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    pub fn linear(&self) -> &CscMatrix<f64> {
        &self.linear
    }

    /// Right-hand side, one entry per row.
    pub fn constant(&self) -> &DVector<f64> {
        &self.constant
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.linear.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Side of a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Upper,
    Lower,
}

/// Per-column bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub(crate) model: ModelId,
    pub(crate) columns: Vec<usize>,
    pub(crate) values: Vec<f64>,
    pub(crate) kind: BoundKind,
}

impl Bounds {
    /// Bounds on every element of a block; a single value is broadcast.
    pub(crate) fn for_block(vars: &Vars, values: Vec<f64>, kind: BoundKind) -> Result<Self> {
        let values = match values.len() {
            1 => vec![values[0]; vars.size()],
            n if n == vars.size() => values,
            n => {
                return Err(CvxError::ShapeMismatch {
                    expected: format!("1 or {} bound values", vars.size()),
                    got: format!("{} values", n),
                })
            }
        };
        Ok(Bounds {
            model: vars.model,
            columns: (vars.first..vars.end()).collect(),
            values,
            kind,
        })
    }

    pub(crate) fn uniform(vars: &Vars, value: f64, kind: BoundKind) -> Self {
        Bounds {
            model: vars.model,
            columns: (vars.first..vars.end()).collect(),
            values: vec![value; vars.size()],
            kind,
        }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn kind(&self) -> BoundKind {
        self.kind
    }

    /// `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.columns.iter().copied().zip(self.values.iter().copied())
    }
}

/// Convex constraint relating `affine_in` and `affine_out` through a
/// [`ConvexKind`].
///
/// Norm kinds and `Exp` read `f(affine_in) <= affine_out`. Squared kinds
/// read `f(affine_in) + affine_out <= 0`. Elementwise kinds carry an
/// `affine_out` of the same size as `affine_in`; the others a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct CvxConstr {
    pub(crate) model: Option<ModelId>,
    pub(crate) affine_in: Affine,
    pub(crate) affine_out: Affine,
    pub(crate) kind: ConvexKind,
}

impl CvxConstr {
    /// Build from `f(affine_in) + residual <= 0`.
    pub(crate) fn from_residual(affine_in: Affine, residual: Affine, kind: ConvexKind) -> Result<Self> {
        let model = merge_models(affine_in.model, residual.model)?;
        let residual = if kind.is_elementwise() {
            if residual.size() != affine_in.size() && residual.size() != 1 {
                return Err(CvxError::ShapeMismatch {
                    expected: affine_in.shape().to_string(),
                    got: residual.shape().to_string(),
                });
            }
            let mut residual = residual.broadcast(affine_in.size());
            residual.shape = *affine_in.shape();
            residual
        } else if residual.size() != 1 {
            return Err(CvxError::ShapeMismatch {
                expected: "()".to_string(),
                got: residual.shape().to_string(),
            });
        } else {
            residual
        };
        let affine_out = if kind.stores_bound() {
            residual.neg()
        } else {
            residual
        };
        Ok(CvxConstr {
            model,
            affine_in,
            affine_out,
            kind,
        })
    }

    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    pub fn affine_in(&self) -> &Affine {
        &self.affine_in
    }

    pub fn affine_out(&self) -> &Affine {
        &self.affine_out
    }

    pub fn kind(&self) -> ConvexKind {
        self.kind
    }
}

/// Second-order cone membership over existing columns:
/// `||x[vector]||_2 <= x[apex]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeConstr {
    pub(crate) model: ModelId,
    pub(crate) apex: VarSub,
    pub(crate) vector: VarSub,
}

impl ConeConstr {
    /// `apex` must reference exactly one element.
    pub fn new(vector: &VarSub, apex: &VarSub) -> Result<Self> {
        if apex.indices().len() != 1 {
            return Err(CvxError::ShapeMismatch {
                expected: "a single apex element".to_string(),
                got: format!("{} elements", apex.indices().len()),
            });
        }
        if vector.vars().model() != apex.vars().model() {
            return Err(CvxError::Ownership);
        }
        Ok(ConeConstr {
            model: apex.vars().model(),
            apex: apex.clone(),
            vector: vector.clone(),
        })
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Global column of the apex.
    pub fn apex_column(&self) -> usize {
        self.apex.vars().first() + self.apex.indices()[0]
    }

    /// Global columns of the vector part, in order.
    pub fn vector_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.vector.columns()
    }
}

/// Exponential cone membership `(x, y, z)`: `y * exp(x / y) <= z`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpConeConstr {
    pub(crate) model: ModelId,
    pub(crate) columns: [usize; 3],
}

impl ExpConeConstr {
    /// Each argument must reference exactly one element.
    pub fn new(x: &VarSub, y: &VarSub, z: &VarSub) -> Result<Self> {
        let model = x.vars().model();
        let mut columns = [0; 3];
        for (slot, sub) in columns.iter_mut().zip([x, y, z]) {
            if sub.vars().model() != model {
                return Err(CvxError::Ownership);
            }
            match sub.indices() {
                [index] => *slot = sub.vars().first() + index,
                other => {
                    return Err(CvxError::ShapeMismatch {
                        expected: "a single element".to_string(),
                        got: format!("{} elements", other.len()),
                    })
                }
            }
        }
        Ok(ExpConeConstr { model, columns })
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn columns(&self) -> [usize; 3] {
        self.columns
    }
}

/// Any constraint a model may be asked to store.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Linear(LinConstr),
    Bounds(Bounds),
    Convex(CvxConstr),
    Cone(ConeConstr),
    ExpCone(ExpConeConstr),
}

impl Constraint {
    /// Owning model, `None` for constraints built from constants only.
    pub fn model(&self) -> Option<ModelId> {
        match self {
            Constraint::Linear(c) => c.model,
            Constraint::Bounds(c) => Some(c.model),
            Constraint::Convex(c) => c.model,
            Constraint::Cone(c) => Some(c.model),
            Constraint::ExpCone(c) => Some(c.model),
        }
    }

    /// Short name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Constraint::Linear(_) => "linear constraint",
            Constraint::Bounds(_) => "bounds",
            Constraint::Convex(_) => "convex constraint",
            Constraint::Cone(_) => "second-order cone constraint",
            Constraint::ExpCone(_) => "exponential cone constraint",
        }
    }
}

macro_rules! impl_from_constraint {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Constraint {
                fn from(c: $ty) -> Self {
                    Constraint::$variant(c)
                }
            }
        )*
    };
}

impl_from_constraint!(
    LinConstr => Linear,
    Bounds => Bounds,
    CvxConstr => Convex,
    ConeConstr => Cone,
    ExpConeConstr => ExpCone,
);
