//! Expansion of second-order cone constraints.
//!
//! Every core-handled convex constraint becomes auxiliary blocks tied to its
//! operands by equalities, plus one or more cone records:
//!
//! - `Norm2`: `left = in`, `right = out`, record `[right, left...]`.
//! - `Square`: `a1 = (1 + out) / 2`, `a2 = in`, `a3 = (1 - out) / 2`,
//!   `a3 >= 0`, one record `[a3_i, a1_i, a2_i]` per element.
//! - `SumSquares`: same blocks, one record `[a3, a1, a2...]`.
//!
//! Squared kinds carry the negated bound in `out`, so `a3 >= ||(a1, a2)||`
//! reads `-out >= ||in||^2`.

use crate::constraints::{ConeConstr, CvxConstr};
use crate::error::{CvxError, Result};
use crate::expr::{ConvexKind, Vars};
use crate::lp::formulation::Formulation;

/// Expand one convex constraint into `form`, appending its cone records.
pub(crate) fn expand_convex(
    form: &mut Formulation,
    constr: &CvxConstr,
    qmat: &mut Vec<Vec<usize>>,
) -> Result<()> {
    let input = constr.affine_in();
    let output = constr.affine_out();

    match constr.kind() {
        ConvexKind::Norm2 => {
            let left = form.aux(*input.shape());
            let right = form.aux(*output.shape());
            form.push_constr(input.sub(&left)?.eq(0.0)?);
            form.push_constr(output.sub(&right)?.eq(0.0)?);
            qmat.push(
                std::iter::once(right.first())
                    .chain(left.first()..left.end())
                    .collect(),
            );
        }
        ConvexKind::Square | ConvexKind::SumSquares => {
            let (a1, a2, a3) = rotated_blocks(form, constr)?;
            if constr.kind() == ConvexKind::Square {
                for i in 0..a2.size() {
                    qmat.push(vec![a3.first() + i, a1.first() + i, a2.first() + i]);
                }
            } else {
                qmat.push(
                    [a3.first(), a1.first()]
                        .into_iter()
                        .chain(a2.first()..a2.end())
                        .collect(),
                );
            }
        }
        kind => {
            return Err(CvxError::Internal(format!(
                "{:?} constraint reached the cone expansion",
                kind
            )))
        }
    }

    log::trace!(
        "expanded {:?} constraint: {} cone records so far, next column {}",
        constr.kind(),
        qmat.len(),
        form.column_count()
    );
    Ok(())
}

/// Auxiliary blocks of the rotated-cone identity for squared kinds.
fn rotated_blocks(form: &mut Formulation, constr: &CvxConstr) -> Result<(Vars, Vars, Vars)> {
    let input = constr.affine_in();
    let output = constr.affine_out();

    let a1 = form.aux(*output.shape());
    let a2 = form.aux(*input.shape());
    let a3 = form.aux(*output.shape());

    form.push_constr(a1.to_affine().sub(output.offset(1.0).scale(0.5))?.eq(0.0)?);
    form.push_constr(a2.to_affine().sub(input)?.eq(0.0)?);
    form.push_constr(a3.to_affine().sub(output.neg().offset(1.0).scale(0.5))?.eq(0.0)?);
    form.push_bound(a3.nonneg());

    Ok((a1, a2, a3))
}

/// Record of a direct cone constraint: apex column, then vector columns.
pub(crate) fn cone_record(constr: &ConeConstr) -> Vec<usize> {
    std::iter::once(constr.apex_column())
        .chain(constr.vector_columns())
        .collect()
}
