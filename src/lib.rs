//! # cvxsocp
//!
//! Reformulation of convex constraints into second-order cone programs.
//!
//! cvxsocp takes constraints stated over model variables (linear relations,
//! bounds, convex functions of affine expressions and direct cone
//! memberships) and produces a canonical program: a linear system plus an
//! explicit list of second-order cone records, ready to be handed to a conic
//! solver. It also derives the dual cone program.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cvxsocp::prelude::*;
//!
//! let mut model = Model::new();
//! let x = model.dvar(2);
//! let t = model.dvar(1);
//!
//! model.st(sumsqr(&x).le(&t)?)?;
//! model.min(&t)?;
//!
//! let primal = model.canonicalize()?;
//! println!("{}", primal);
//! println!("{}", primal.showqc());
//! ```
//!
//! ## Convex kinds
//!
//! - Piecewise-linear, rewritten into linear rows: `abs`, `norm(x, One)`,
//!   `norm(x, Inf)`
//! - Second-order cone representable: `norm(x, Two)`, `square`, `sumsqr`
//! - `exp` builds constraints a second-order cone model rejects
//!
//! ## Architecture
//!
//! - **Linear layer** (`lp`): variables, linear constraints, bounds and
//!   piecewise-linear constraints; canonical `LinearProgram` and its dual
//! - **Cone layer** (`socp`): routes constraints, expands cone constraints
//!   into auxiliary columns and cone records, derives the dual cone program
//! - **Caching**: canonical programs are built on demand and reused until
//!   the model changes

pub mod cache;
pub mod constraints;
pub mod error;
pub mod expr;
pub mod lp;
pub mod settings;
pub mod socp;
pub mod sparse;
pub mod table;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use cvxsocp::prelude::*;
/// ```
pub mod prelude {
    // Expressions
    pub use crate::expr::{
        abs, exp, norm, square, sumsqr, Affine, Convex, ConvexKind, Degree, Handler, ModelId,
        Shape, VarSub, VarType, Vars,
    };

    // Constraints
    pub use crate::constraints::{
        BoundKind, Bounds, ConeConstr, Constraint, ConstraintTree, CvxConstr, ExpConeConstr,
        LinConstr, Sense,
    };

    // Models and programs
    pub use crate::lp::{Form, LinearModel, LinearProgram, Objective};
    pub use crate::socp::{Model, SocProgram};

    pub use crate::settings::Settings;
    pub use crate::table::Table;

    // Errors
    pub use crate::error::{CvxError, Result};
}

// Re-export main types at crate root
pub use error::{CvxError, Result};
pub use lp::{Form, LinearModel, LinearProgram};
pub use socp::{Model, SocProgram};
