//! Constraint types and nested constraint collections.

pub mod constraint;
pub mod tree;

pub use constraint::{
    BoundKind, Bounds, ConeConstr, Constraint, CvxConstr, ExpConeConstr, LinConstr, Sense,
};
pub use tree::ConstraintTree;
