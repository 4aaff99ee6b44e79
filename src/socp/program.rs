//! Canonical second-order cone program.

use std::fmt;
use std::ops::Deref;

use nalgebra::DMatrix;

use crate::constraints::Sense;
use crate::error::{CvxError, Result};
use crate::lp::LinearProgram;
use crate::table::Table;

/// A linear program plus second-order cone memberships.
///
/// Each record in `qmat` lists column indices: the first is the cone's scalar
/// bound, the rest its vector part, i.e. `||x[rec[1..]]||_2 <= x[rec[0]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SocProgram {
    pub lp: LinearProgram,
    pub qmat: Vec<Vec<usize>>,
}

impl SocProgram {
    /// Pair a linear program with cone records, checking every index.
    pub fn new(lp: LinearProgram, qmat: Vec<Vec<usize>>) -> Result<Self> {
        if qmat.iter().any(Vec::is_empty) {
            return Err(CvxError::Internal("empty cone record".to_string()));
        }
        Self::with_records(lp, qmat)
    }

    /// Like [`SocProgram::new`], but records may be empty. A dual cone has no
    /// members when its identity rows reference no dual column.
    pub(crate) fn with_records(lp: LinearProgram, qmat: Vec<Vec<usize>>) -> Result<Self> {
        let n = lp.ncols();
        for record in &qmat {
            if let Some(&index) = record.iter().find(|&&i| i >= n) {
                return Err(CvxError::IndexOutOfRange { index, size: n });
            }
        }
        Ok(SocProgram { lp, qmat })
    }

    /// Cone records as rows `QC1..QCk` over columns `q1..qn`: `-1` at the
    /// scalar bound, `+1` on the vector part, sense `<=`, constant 0.
    pub fn showqc(&self) -> Table {
        let n = self.lp.ncols();
        let k = self.qmat.len();
        let mut coefficients = DMatrix::zeros(k, n);
        for (row, record) in self.qmat.iter().enumerate() {
            if let Some((&bound, vector)) = record.split_first() {
                coefficients[(row, bound)] = -1.0;
                for &j in vector {
                    coefficients[(row, j)] = 1.0;
                }
            }
        }
        Table {
            row_labels: Table::labels("QC", k),
            col_labels: Table::labels("q", n),
            coefficients,
            senses: vec![Sense::Le; k],
            constants: vec![0.0; k],
        }
    }
}

impl Deref for SocProgram {
    type Target = LinearProgram;

    fn deref(&self) -> &LinearProgram {
        &self.lp
    }
}

impl fmt::Display for SocProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Second order cone program object:")?;
        self.lp.write_summary(f)?;
        writeln!(f, "---------------------------------------------")?;
        writeln!(f, "Number of SOC constraints:     {}", self.qmat.len())
    }
}
