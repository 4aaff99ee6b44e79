//! Per-call builder for auxiliary columns, rows and bounds.

use crate::constraints::{Bounds, CvxConstr, LinConstr};
use crate::error::{CvxError, Result};
use crate::expr::{ConvexKind, ModelId, Shape, VarType, Vars};

/// Auxiliary columns and relations introduced while canonicalizing a model.
///
/// Lives for one canonicalization only; the model's stores are never touched.
#[derive(Debug)]
pub(crate) struct Formulation {
    model: ModelId,
    next: usize,
    pub(crate) aux: Vec<Vars>,
    pub(crate) constraints: Vec<LinConstr>,
    pub(crate) bounds: Vec<Bounds>,
}

impl Formulation {
    /// Start allocating auxiliary columns at `next`.
    pub(crate) fn new(model: ModelId, next: usize) -> Self {
        Formulation {
            model,
            next,
            aux: Vec::new(),
            constraints: Vec::new(),
            bounds: Vec::new(),
        }
    }

    /// Allocate a continuous auxiliary block.
    pub(crate) fn aux(&mut self, shape: Shape) -> Vars {
        let vars = Vars::new(self.model, self.next, shape, VarType::Continuous, None);
        self.next = vars.end();
        self.aux.push(vars.clone());
        vars
    }

    pub(crate) fn push_constr(&mut self, constr: LinConstr) {
        self.constraints.push(constr);
    }

    pub(crate) fn push_bound(&mut self, bound: Bounds) {
        self.bounds.push(bound);
    }

    /// Total number of columns including the auxiliary ones.
    pub(crate) fn column_count(&self) -> usize {
        self.next
    }

    /// Rewrite a piecewise-linear convex constraint into linear rows.
    ///
    /// `Abs` and `NormInf` become `in <= out` and `-in <= out`; `Norm1` goes
    /// through an auxiliary block `u` with `-u <= in <= u` and `sum(u) <= out`.
    pub(crate) fn linearize(&mut self, constr: &CvxConstr) -> Result<()> {
        let input = constr.affine_in();
        let output = constr.affine_out();
        match constr.kind() {
            ConvexKind::Abs | ConvexKind::NormInf => {
                self.push_constr(input.sub(output)?.le(0.0)?);
                self.push_constr(input.neg().sub(output)?.le(0.0)?);
            }
            ConvexKind::Norm1 => {
                let u = self.aux(*input.shape());
                self.push_constr(input.sub(&u)?.le(0.0)?);
                self.push_constr(input.neg().sub(&u)?.le(0.0)?);
                self.push_constr(u.to_affine().sum().sub(output)?.le(0.0)?);
            }
            kind => {
                return Err(CvxError::Internal(format!(
                    "{:?} is not piecewise-linear",
                    kind
                )))
            }
        }
        log::trace!("linearized {:?} constraint of size {}", constr.kind(), input.size());
        Ok(())
    }
}
