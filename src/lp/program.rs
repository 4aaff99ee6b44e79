//! Canonical linear program.

use std::fmt;

use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;

use crate::constraints::Sense;
use crate::expr::VarType;
use crate::sparse::csc_to_dense;
use crate::table::Table;

/// `min objective' x  s.t.  linear x (senses) constants,  lower <= x <= upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    /// Constraint matrix (m x n).
    pub linear: CscMatrix<f64>,
    /// Right-hand side (m).
    pub constants: DVector<f64>,
    /// Row senses (m).
    pub senses: Vec<Sense>,
    /// Column types (n).
    pub vtypes: Vec<VarType>,
    /// Column upper bounds (n), `+inf` if unbounded.
    pub upper: DVector<f64>,
    /// Column lower bounds (n), `-inf` if unbounded.
    pub lower: DVector<f64>,
    /// Objective coefficients (n).
    pub objective: DVector<f64>,
}

impl LinearProgram {
    /// Number of constraint rows.
    pub fn nrows(&self) -> usize {
        self.linear.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.linear.ncols()
    }

    /// Constraint rows `C1..Cm` over columns `x1..xn`.
    pub fn show(&self) -> Table {
        Table {
            row_labels: Table::labels("C", self.nrows()),
            col_labels: Table::labels("x", self.ncols()),
            coefficients: csc_to_dense(&self.linear),
            senses: self.senses.clone(),
            constants: self.constants.iter().copied().collect(),
        }
    }

    fn count_vtype(&self, vtype: VarType) -> usize {
        self.vtypes.iter().filter(|&&v| v == vtype).count()
    }

    pub(crate) fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inequalities = self.senses.iter().filter(|&&s| s == Sense::Le).count();
        writeln!(f, "=============================================")?;
        writeln!(f, "Number of variables:           {}", self.ncols())?;
        writeln!(
            f,
            "Continuous/binaries/integers:  {}/{}/{}",
            self.count_vtype(VarType::Continuous),
            self.count_vtype(VarType::Binary),
            self.count_vtype(VarType::Integer)
        )?;
        writeln!(f, "---------------------------------------------")?;
        writeln!(f, "Number of linear constraints:  {}", self.nrows())?;
        writeln!(
            f,
            "Inequalities/equalities:       {}/{}",
            inequalities,
            self.nrows() - inequalities
        )?;
        writeln!(f, "Number of coefficients:        {}", self.linear.nnz())
    }
}

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear program object:")?;
        self.write_summary(f)
    }
}
