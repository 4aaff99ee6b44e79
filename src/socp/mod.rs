//! Second-order cone models and their canonical programs.
//!
//! This module provides:
//! - `Model` - routes constraints to the linear store or the cone stores
//! - `SocProgram` - linear system plus cone membership records
//! - `derive_dual` - dual cone program from a primal and its linear dual

pub(crate) mod canonicalizer;

pub mod dual;
pub mod model;
pub mod program;

pub use dual::derive_dual;
pub use model::Model;
pub use program::SocProgram;
