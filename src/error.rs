//! Error types for cvxsocp.

use thiserror::Error;

use crate::expr::ConvexKind;

/// Error type for cvxsocp operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CvxError {
    /// The constraint or expression was built from another model's variables.
    #[error("Constraints are not defined for this model")]
    Ownership,

    /// Convex category not handled by this model.
    #[error("Unsupported convex category: {0:?}")]
    UnsupportedCategory(ConvexKind),

    /// Constraint type not handled by this model.
    #[error("Unsupported constraint type: {0}")]
    UnsupportedConstraint(&'static str),

    /// Constraint collections nested deeper than the configured limit.
    #[error("Constraint collections nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Variable index out of range.
    #[error("Index {index} out of range for {size} elements")]
    IndexOutOfRange { index: usize, size: usize },

    /// Convex expression used against its curvature.
    #[error("Nonconvex constraint or objective: {0}")]
    NotConvex(String),

    /// The linear dual does not exist for this program.
    #[error("Dual problem undefined: {0}")]
    DualUndefined(String),

    /// Internal consistency failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for cvxsocp operations.
pub type Result<T> = std::result::Result<T, CvxError>;
