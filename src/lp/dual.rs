//! Linear programming duality.
//!
//! For `min c'x  s.t.  A x (<= | ==) b,  lb <= x <= ub` a zero bound fixes the
//! sign of a column (`lb == 0` gives `x >= 0`, otherwise `ub == 0` gives
//! `x <= 0`); any other finite bound becomes an extra `<=` row. The dual has
//! one row per primal column and one column per (augmented) primal row:
//!
//! ```text
//! min -b'y  s.t.  s_j (A'y)_j (<= | ==) s_j c_j,   y_i <= 0 for <= rows
//! ```
//!
//! where `s_j = -1` for non-positive columns and `1` otherwise, and row `j`
//! is an equality exactly when column `j` is free.

use nalgebra::DVector;

use super::program::LinearProgram;
use crate::constraints::Sense;
use crate::error::{CvxError, Result};
use crate::expr::VarType;
use crate::sparse::{csc_from_triplets, csc_triplets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSign {
    NonNeg,
    NonPos,
    Free,
}

impl ColumnSign {
    fn of(lower: f64, upper: f64) -> Self {
        if lower == 0.0 {
            ColumnSign::NonNeg
        } else if upper == 0.0 {
            ColumnSign::NonPos
        } else {
            ColumnSign::Free
        }
    }

    fn factor(self) -> f64 {
        match self {
            ColumnSign::NonPos => -1.0,
            _ => 1.0,
        }
    }
}

/// Dual of a continuous linear program.
pub fn dualize(primal: &LinearProgram) -> Result<LinearProgram> {
    if let Some(j) = primal.vtypes.iter().position(|&v| v != VarType::Continuous) {
        return Err(CvxError::DualUndefined(format!(
            "column {} has type {}",
            j + 1,
            primal.vtypes[j]
        )));
    }

    let m = primal.nrows();
    let n = primal.ncols();
    let signs: Vec<ColumnSign> = (0..n)
        .map(|j| ColumnSign::of(primal.lower[j], primal.upper[j]))
        .collect();

    // Transposed triplets of A, then one row per remaining finite bound.
    let (rows, cols, vals) = csc_triplets(&primal.linear);
    let mut dual_rows = cols;
    let mut dual_cols = rows;
    let mut dual_vals = vals;
    let mut b: Vec<f64> = primal.constants.iter().copied().collect();
    let mut le_rows: Vec<bool> = primal.senses.iter().map(|&s| s == Sense::Le).collect();

    for (j, sign) in signs.iter().enumerate() {
        let (lower, upper) = (primal.lower[j], primal.upper[j]);
        if *sign != ColumnSign::NonPos && upper.is_finite() {
            dual_rows.push(j);
            dual_cols.push(b.len());
            dual_vals.push(1.0);
            b.push(upper);
            le_rows.push(true);
        }
        if *sign != ColumnSign::NonNeg && lower.is_finite() {
            dual_rows.push(j);
            dual_cols.push(b.len());
            dual_vals.push(-1.0);
            b.push(-lower);
            le_rows.push(true);
        }
    }

    let dual_vals = dual_rows
        .iter()
        .zip(dual_vals)
        .map(|(&j, v)| signs[j].factor() * v)
        .collect();
    let ncols = b.len();
    log::debug!(
        "dual of {}x{} program: {} bound rows added",
        m,
        n,
        ncols - m
    );

    Ok(LinearProgram {
        linear: csc_from_triplets(n, ncols, dual_rows, dual_cols, dual_vals),
        constants: DVector::from_iterator(
            n,
            signs
                .iter()
                .enumerate()
                .map(|(j, s)| s.factor() * primal.objective[j]),
        ),
        senses: signs
            .iter()
            .map(|&s| if s == ColumnSign::Free { Sense::Eq } else { Sense::Le })
            .collect(),
        vtypes: vec![VarType::Continuous; ncols],
        upper: DVector::from_iterator(
            ncols,
            le_rows.iter().map(|&le| if le { 0.0 } else { f64::INFINITY }),
        ),
        lower: DVector::from_element(ncols, f64::NEG_INFINITY),
        objective: DVector::from_iterator(ncols, b.into_iter().map(|v| -v)),
    })
}
