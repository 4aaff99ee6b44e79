//! Linear models and their canonical programs.
//!
//! This module provides:
//! - `LinearModel` - variables, linear constraints, bounds and
//!   piecewise-linear convex constraints
//! - `LinearProgram` - the canonical (matrix) form of a linear model
//! - `dualize` - the dual of a continuous linear program

pub(crate) mod formulation;

pub mod dual;
pub mod model;
pub mod program;

pub use dual::dualize;
pub use model::{Form, LinearModel, Objective};
pub use program::LinearProgram;
