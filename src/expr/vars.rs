//! Decision variable blocks.
//!
//! A model allocates its columns in contiguous blocks. A `Vars` handle records
//! the block's first column and shape; `VarSub` picks elements out of a block.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::affine::Affine;
use super::shape::Shape;
use crate::constraints::{BoundKind, Bounds, LinConstr};
use crate::error::{CvxError, Result};

/// Unique identifier for models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    /// Generate a new unique ID.
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        ModelId(NEXT_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarType {
    /// Real-valued.
    #[default]
    Continuous,
    /// Restricted to {0, 1}.
    Binary,
    /// Integer-valued.
    Integer,
}

impl VarType {
    /// One-letter code used in diagnostic tables.
    pub fn code(self) -> char {
        match self {
            VarType::Continuous => 'C',
            VarType::Binary => 'B',
            VarType::Integer => 'I',
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A block of decision variables owned by one model.
#[derive(Debug, Clone, PartialEq)]
pub struct Vars {
    pub(crate) model: ModelId,
    pub(crate) first: usize,
    pub(crate) shape: Shape,
    pub(crate) vtype: VarType,
    pub(crate) name: Option<String>,
}

impl Vars {
    pub(crate) fn new(
        model: ModelId,
        first: usize,
        shape: Shape,
        vtype: VarType,
        name: Option<String>,
    ) -> Self {
        Vars {
            model,
            first,
            shape,
            vtype,
            name,
        }
    }

    /// Owning model.
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// First column of the block.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Number of columns in the block.
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    /// One past the last column of the block.
    pub fn end(&self) -> usize {
        self.first + self.size()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn vtype(&self) -> VarType {
        self.vtype
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The block as an affine expression with identity coefficients.
    pub fn to_affine(&self) -> Affine {
        Affine::from_vars(self)
    }

    /// Reference a single element (row-major flat index).
    pub fn get(&self, index: usize) -> Result<VarSub> {
        self.select([index])
    }

    /// Reference several elements (row-major flat indices), in the given order.
    pub fn select(&self, indices: impl IntoIterator<Item = usize>) -> Result<VarSub> {
        let indices: Vec<usize> = indices.into_iter().collect();
        if let Some(&index) = indices.iter().find(|&&i| i >= self.size()) {
            return Err(CvxError::IndexOutOfRange {
                index,
                size: self.size(),
            });
        }
        Ok(VarSub {
            vars: self.clone(),
            indices,
        })
    }

    /// Reference every element of the block.
    pub fn all(&self) -> VarSub {
        VarSub {
            vars: self.clone(),
            indices: (0..self.size()).collect(),
        }
    }

    /// Upper bounds `x <= values` (a single value applies to every element).
    pub fn upper(&self, values: impl Into<Vec<f64>>) -> Result<Bounds> {
        Bounds::for_block(self, values.into(), BoundKind::Upper)
    }

    /// Lower bounds `x >= values` (a single value applies to every element).
    pub fn lower(&self, values: impl Into<Vec<f64>>) -> Result<Bounds> {
        Bounds::for_block(self, values.into(), BoundKind::Lower)
    }

    /// `x >= 0`.
    pub fn nonneg(&self) -> Bounds {
        Bounds::uniform(self, 0.0, BoundKind::Lower)
    }

    /// `x <= 0`.
    pub fn nonpos(&self) -> Bounds {
        Bounds::uniform(self, 0.0, BoundKind::Upper)
    }

    /// Linear constraint `x <= rhs`.
    pub fn le(&self, rhs: impl Into<Affine>) -> Result<LinConstr> {
        self.to_affine().le(rhs)
    }

    /// Linear constraint `x >= rhs`.
    pub fn ge(&self, rhs: impl Into<Affine>) -> Result<LinConstr> {
        self.to_affine().ge(rhs)
    }

    /// Linear constraint `x == rhs`.
    pub fn eq(&self, rhs: impl Into<Affine>) -> Result<LinConstr> {
        self.to_affine().eq(rhs)
    }
}

impl From<&Vars> for Affine {
    fn from(vars: &Vars) -> Self {
        Affine::from_vars(vars)
    }
}

impl From<Vars> for Affine {
    fn from(vars: Vars) -> Self {
        Affine::from_vars(&vars)
    }
}

/// A selection of elements from one variable block.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSub {
    pub(crate) vars: Vars,
    pub(crate) indices: Vec<usize>,
}

impl VarSub {
    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Element indices within the block.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Global columns of the selected elements.
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().map(move |i| self.vars.first + i)
    }

    /// The selection as a vector-shaped affine expression.
    pub fn to_affine(&self) -> Affine {
        Affine::from_columns(self.vars.model, self.columns().collect())
    }
}

impl From<&VarSub> for Affine {
    fn from(sub: &VarSub) -> Self {
        sub.to_affine()
    }
}
