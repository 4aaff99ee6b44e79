//! Expression types.
//!
//! This module provides the building blocks for constraints and objectives:
//! - `Vars` / `VarSub` - blocks of model columns and element references
//! - `Affine` - affine expressions in standard form `A x + b`
//! - `Convex` - a convex function of an affine expression
//! - `Shape` - shape information for expressions

pub mod affine;
pub mod convex;
pub mod shape;
pub mod vars;

pub use affine::Affine;
pub use convex::{abs, exp, norm, square, sumsqr, Convex, ConvexKind, Degree, Handler};
pub use shape::Shape;
pub use vars::{ModelId, VarSub, VarType, Vars};
