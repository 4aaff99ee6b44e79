//! Model settings.

use crate::expr::VarType;

/// Settings shared by linear and second-order cone models.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum nesting depth of constraint collections passed to `st`.
    pub max_nesting_depth: usize,
    /// Variable type used by `dvar` when none is given.
    pub default_vtype: VarType,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_nesting_depth: 32,
            default_vtype: VarType::Continuous,
        }
    }
}

impl Settings {
    /// Set the maximum collection nesting depth.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the default variable type.
    pub fn default_vtype(mut self, vtype: VarType) -> Self {
        self.default_vtype = vtype;
        self
    }
}
