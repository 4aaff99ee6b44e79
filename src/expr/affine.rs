//! Affine expressions over model columns.
//!
//! An affine expression is stored in standard form `A x + b`: `A` is a sparse
//! coefficient matrix with one row per element (row-major flattening of the
//! shape) and one column per model column, `b` is a dense constant vector.
//! The coefficient matrix is only as wide as the highest column referenced;
//! operands of different widths are widened on combination.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CscMatrix;

use super::shape::Shape;
use super::vars::{ModelId, Vars};
use crate::constraints::{LinConstr, Sense};
use crate::error::{CvxError, Result};
use crate::sparse::{
    csc_add, csc_from_triplets, csc_repeat_rows, csc_scale, csc_select_rows, csc_triplets,
    dense_csc_matmul,
};

/// An affine expression `A x + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    pub(crate) model: Option<ModelId>,
    pub(crate) shape: Shape,
    pub(crate) linear: CscMatrix<f64>,
    pub(crate) constant: DVector<f64>,
}

impl Affine {
    /// Identity expression of a variable block.
    pub fn from_vars(vars: &Vars) -> Self {
        let size = vars.size();
        let rows: Vec<usize> = (0..size).collect();
        let cols: Vec<usize> = (vars.first..vars.end()).collect();
        Affine {
            model: Some(vars.model),
            shape: vars.shape,
            linear: csc_from_triplets(size, vars.end(), rows, cols, vec![1.0; size]),
            constant: DVector::zeros(size),
        }
    }

    /// Vector expression picking the given columns.
    pub(crate) fn from_columns(model: ModelId, columns: Vec<usize>) -> Self {
        let size = columns.len();
        let width = columns.iter().max().map_or(0, |c| c + 1);
        Affine {
            model: Some(model),
            shape: Shape::vector(size),
            linear: csc_from_triplets(size, width, (0..size).collect(), columns, vec![1.0; size]),
            constant: DVector::zeros(size),
        }
    }

    /// Constant expression with the given shape and row-major values.
    pub fn constant(shape: impl Into<Shape>, values: impl Into<Vec<f64>>) -> Result<Self> {
        let shape = shape.into();
        let values = values.into();
        if values.len() != shape.size() {
            return Err(CvxError::ShapeMismatch {
                expected: format!("{} values for shape {}", shape.size(), shape),
                got: format!("{} values", values.len()),
            });
        }
        Ok(Affine {
            model: None,
            linear: CscMatrix::zeros(shape.size(), 0),
            constant: DVector::from_vec(values),
            shape,
        })
    }

    /// All-zero constant of the given shape.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Affine {
            model: None,
            linear: CscMatrix::zeros(shape.size(), 0),
            constant: DVector::zeros(shape.size()),
            shape,
        }
    }

    /// Scalar constant.
    pub fn scalar(value: f64) -> Self {
        Affine {
            model: None,
            shape: Shape::scalar(),
            linear: CscMatrix::zeros(1, 0),
            constant: DVector::from_element(1, value),
        }
    }

    /// Owning model, `None` for pure constants.
    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    /// Coefficient matrix, one row per element.
    pub fn linear(&self) -> &CscMatrix<f64> {
        &self.linear
    }

    /// Constant term, one entry per element.
    pub fn constant_term(&self) -> &DVector<f64> {
        &self.constant
    }

    /// Check if this is a constant (no columns referenced).
    pub fn is_constant(&self) -> bool {
        self.linear.nnz() == 0
    }

    /// Add an expression; single-element operands are broadcast.
    pub fn add(&self, rhs: impl Into<Affine>) -> Result<Affine> {
        let rhs = rhs.into();
        let model = merge_models(self.model, rhs.model)?;
        let shape = self
            .shape
            .elementwise(&rhs.shape)
            .ok_or_else(|| CvxError::ShapeMismatch {
                expected: self.shape.to_string(),
                got: rhs.shape.to_string(),
            })?;
        let size = shape.size();
        let lhs = self.broadcast(size);
        let rhs = rhs.broadcast(size);
        Ok(Affine {
            model,
            shape,
            linear: csc_add(&lhs.linear, &rhs.linear),
            constant: &lhs.constant + &rhs.constant,
        })
    }

    /// Subtract an expression; single-element operands are broadcast.
    pub fn sub(&self, rhs: impl Into<Affine>) -> Result<Affine> {
        self.add(rhs.into().neg())
    }

    /// Negate.
    pub fn neg(&self) -> Affine {
        self.scale(-1.0)
    }

    /// Multiply by a scalar.
    pub fn scale(&self, scalar: f64) -> Affine {
        Affine {
            model: self.model,
            shape: self.shape,
            linear: csc_scale(&self.linear, scalar),
            constant: &self.constant * scalar,
        }
    }

    /// Add a scalar to every element.
    pub fn offset(&self, value: f64) -> Affine {
        Affine {
            model: self.model,
            shape: self.shape,
            linear: self.linear.clone(),
            constant: self.constant.add_scalar(value),
        }
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Affine {
        let (rows, cols, vals) = csc_triplets(&self.linear);
        let rows = vec![0; rows.len()];
        Affine {
            model: self.model,
            shape: Shape::scalar(),
            linear: csc_from_triplets(1, self.linear.ncols(), rows, cols, vals),
            constant: DVector::from_element(1, self.constant.sum()),
        }
    }

    /// Single element as a scalar expression.
    pub fn get(&self, index: usize) -> Result<Affine> {
        let mut picked = self.select([index])?;
        picked.shape = Shape::scalar();
        Ok(picked)
    }

    /// Elements at the given row-major indices, as a vector expression.
    pub fn select(&self, indices: impl IntoIterator<Item = usize>) -> Result<Affine> {
        let indices: Vec<usize> = indices.into_iter().collect();
        if let Some(&index) = indices.iter().find(|&&i| i >= self.size()) {
            return Err(CvxError::IndexOutOfRange {
                index,
                size: self.size(),
            });
        }
        Ok(Affine {
            model: self.model,
            shape: Shape::vector(indices.len()),
            linear: csc_select_rows(&self.linear, &indices),
            constant: DVector::from_iterator(indices.len(), indices.iter().map(|&i| self.constant[i])),
        })
    }

    /// Left-multiply by a constant matrix: `A @ self`.
    pub fn matmul_left(&self, a: &DMatrix<f64>) -> Result<Affine> {
        let shape = self
            .shape
            .left_product(a.nrows(), a.ncols())
            .ok_or_else(|| CvxError::ShapeMismatch {
                expected: format!("({}, ...)", a.ncols()),
                got: self.shape.to_string(),
            })?;
        let stride = self.shape.cols();
        let block = DMatrix::from_row_slice(self.shape.rows(), stride, self.constant.as_slice());
        let constant = a * block;
        Ok(Affine {
            model: self.model,
            shape,
            linear: dense_csc_matmul(a, &self.linear, stride),
            constant: DVector::from_iterator(
                constant.len(),
                constant.transpose().iter().copied(),
            ),
        })
    }

    /// Linear constraint `self <= rhs`.
    pub fn le(&self, rhs: impl Into<Affine>) -> Result<LinConstr> {
        Ok(LinConstr::from_residual(self.sub(rhs)?, Sense::Le))
    }

    /// Linear constraint `self >= rhs`.
    pub fn ge(&self, rhs: impl Into<Affine>) -> Result<LinConstr> {
        Ok(LinConstr::from_residual(rhs.into().sub(self)?, Sense::Le))
    }

    /// Linear constraint `self == rhs`.
    pub fn eq(&self, rhs: impl Into<Affine>) -> Result<LinConstr> {
        Ok(LinConstr::from_residual(self.sub(rhs)?, Sense::Eq))
    }

    /// Repeat a single-element expression `size` times.
    pub(crate) fn broadcast(&self, size: usize) -> Affine {
        if self.size() == size {
            return self.clone();
        }
        Affine {
            model: self.model,
            shape: Shape::vector(size),
            linear: csc_repeat_rows(&self.linear, size),
            constant: DVector::from_element(size, self.constant[0]),
        }
    }
}

/// Combine the owners of two operands; constants adopt the other's owner.
pub(crate) fn merge_models(a: Option<ModelId>, b: Option<ModelId>) -> Result<Option<ModelId>> {
    match (a, b) {
        (Some(x), Some(y)) if x != y => Err(CvxError::Ownership),
        (Some(x), _) | (None, Some(x)) => Ok(Some(x)),
        (None, None) => Ok(None),
    }
}

impl From<f64> for Affine {
    fn from(value: f64) -> Self {
        Affine::scalar(value)
    }
}

impl From<Vec<f64>> for Affine {
    fn from(values: Vec<f64>) -> Self {
        Affine {
            model: None,
            shape: Shape::vector(values.len()),
            linear: CscMatrix::zeros(values.len(), 0),
            constant: DVector::from_vec(values),
        }
    }
}

impl From<&Affine> for Affine {
    fn from(expr: &Affine) -> Self {
        expr.clone()
    }
}
