//! Second-order cone model.

use std::sync::Arc;

use super::canonicalizer::{cone_record, expand_convex};
use super::dual::derive_dual;
use super::program::SocProgram;
use crate::cache::Cache;
use crate::constraints::{ConeConstr, Constraint, ConstraintTree, CvxConstr};
use crate::error::{CvxError, Result};
use crate::expr::{Handler, ModelId, Shape, VarType, Vars};
use crate::lp::dualize;
use crate::lp::formulation::Formulation;
use crate::lp::model::BaseItem;
use crate::lp::{Form, LinearModel, LinearProgram, Objective};
use crate::settings::Settings;

/// Where a validated constraint goes.
#[derive(Debug)]
enum Routed {
    Base(BaseItem),
    Convex(CvxConstr),
    Cone(ConeConstr),
}

/// Second-order cone model.
///
/// Linear constraints, bounds and piecewise-linear convex constraints live in
/// the underlying [`LinearModel`]; `Norm2`, `Square` and `SumSquares`
/// constraints and direct cone constraints are kept here and expanded into
/// cone records on canonicalization.
#[derive(Debug, Clone)]
pub struct Model {
    base: LinearModel,
    cvx_constr: Vec<CvxConstr>,
    cone_constr: Vec<ConeConstr>,
    primal: Cache<SocProgram>,
    linear_dual: Cache<LinearProgram>,
    dual: Cache<SocProgram>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Model {
            base: LinearModel::with_settings(settings),
            cvx_constr: Vec::new(),
            cone_constr: Vec::new(),
            primal: Cache::Stale,
            linear_dual: Cache::Stale,
            dual: Cache::Stale,
        }
    }

    /// Set the model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base = self.base.with_name(name);
        self
    }

    pub fn id(&self) -> ModelId {
        self.base.id()
    }

    pub fn name(&self) -> Option<&str> {
        self.base.name()
    }

    pub fn settings(&self) -> &Settings {
        self.base.settings()
    }

    /// The underlying linear store.
    pub fn base(&self) -> &LinearModel {
        &self.base
    }

    /// Stored `Norm2`, `Square` and `SumSquares` constraints.
    pub fn cvx_constr(&self) -> &[CvxConstr] {
        &self.cvx_constr
    }

    /// Stored direct cone constraints.
    pub fn cone_constr(&self) -> &[ConeConstr] {
        &self.cone_constr
    }

    /// Number of columns, including the objective variable.
    pub fn column_count(&self) -> usize {
        self.base.column_count()
    }

    /// The objective variable (column 0).
    pub fn objective_var(&self) -> &Vars {
        self.base.objective_var()
    }

    /// Declare a block of decision variables of the default type.
    pub fn dvar(&mut self, shape: impl Into<Shape>) -> Vars {
        self.invalidate();
        self.base.dvar(shape)
    }

    /// Declare a block of decision variables.
    pub fn dvar_with(
        &mut self,
        shape: impl Into<Shape>,
        vtype: VarType,
        name: Option<&str>,
    ) -> Vars {
        self.invalidate();
        self.base.dvar_with(shape, vtype, name)
    }

    /// Store constraints.
    ///
    /// Collections are flattened in order. Every constraint is validated
    /// before any is stored, so a failing call leaves the model and its
    /// cached programs unchanged.
    pub fn st(&mut self, constraints: impl Into<ConstraintTree>) -> Result<()> {
        let items = constraints
            .into()
            .flatten(self.settings().max_nesting_depth)?;
        let routed = items
            .into_iter()
            .map(|c| self.route(c))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                log::warn!("constraint rejected: {}", e);
                e
            })?;

        for item in routed {
            match item {
                Routed::Base(item) => self.base.store(item),
                Routed::Convex(c) => self.cvx_constr.push(c),
                Routed::Cone(c) => self.cone_constr.push(c),
            }
        }
        self.invalidate();
        Ok(())
    }

    fn route(&self, constr: Constraint) -> Result<Routed> {
        match constr {
            Constraint::Convex(c) => {
                if c.model() != Some(self.id()) {
                    return Err(CvxError::Ownership);
                }
                match c.kind().handler() {
                    Some(Handler::Linear) => {
                        Ok(Routed::Base(self.base.route(Constraint::Convex(c))?))
                    }
                    Some(Handler::SecondOrder) => Ok(Routed::Convex(c)),
                    None => Err(CvxError::UnsupportedCategory(c.kind())),
                }
            }
            Constraint::Cone(c) => {
                if c.model() != self.id() {
                    return Err(CvxError::Ownership);
                }
                Ok(Routed::Cone(c))
            }
            other @ Constraint::ExpCone(_) => {
                Err(CvxError::UnsupportedConstraint(other.type_name()))
            }
            other => Ok(Routed::Base(self.base.route(other)?)),
        }
    }

    /// Minimize an affine or convex expression.
    pub fn min(&mut self, expr: impl Into<Objective>) -> Result<()> {
        self.base
            .set_objective(expr.into(), 1.0, &[Handler::Linear, Handler::SecondOrder])?;
        self.invalidate();
        Ok(())
    }

    /// Maximize an affine or concave expression.
    pub fn max(&mut self, expr: impl Into<Objective>) -> Result<()> {
        self.base
            .set_objective(expr.into(), -1.0, &[Handler::Linear, Handler::SecondOrder])?;
        self.invalidate();
        Ok(())
    }

    /// Build, or fetch from cache, the primal or dual cone program.
    pub fn do_math(&mut self, form: Form) -> Result<Arc<SocProgram>> {
        match form {
            Form::Primal => {
                if let Some(program) = self.primal.get() {
                    log::trace!("primal cone program cache hit");
                    return Ok(program);
                }
                let program = self.build_primal()?;
                log::debug!(
                    "canonical cone program: {} rows, {} columns, {} cone records",
                    program.nrows(),
                    program.ncols(),
                    program.qmat.len()
                );
                Ok(self.primal.set(program))
            }
            Form::Dual => {
                if let Some(program) = self.dual.get() {
                    log::trace!("dual cone program cache hit");
                    return Ok(program);
                }
                let primal = self.do_math(Form::Primal)?;
                let linear_dual = self.linear_dual()?;
                let program = derive_dual(&primal, &linear_dual)?;
                Ok(self.dual.set(program))
            }
        }
    }

    /// Shorthand for `do_math(Form::Primal)`.
    pub fn canonicalize(&mut self) -> Result<Arc<SocProgram>> {
        self.do_math(Form::Primal)
    }

    /// Shorthand for `do_math(Form::Dual)`.
    pub fn derive_dual(&mut self) -> Result<Arc<SocProgram>> {
        self.do_math(Form::Dual)
    }

    /// Linear dual of the primal program's linear system, before the cone
    /// identity rows are removed.
    pub fn linear_dual(&mut self) -> Result<Arc<LinearProgram>> {
        if let Some(program) = self.linear_dual.get() {
            return Ok(program);
        }
        let primal = self.do_math(Form::Primal)?;
        let program = dualize(&primal.lp)?;
        Ok(self.linear_dual.set(program))
    }

    fn build_primal(&self) -> Result<SocProgram> {
        let mut form = Formulation::new(self.id(), self.column_count());

        let mut epigraph = None;
        match self.base.objective_epigraph()? {
            None => {}
            Some(Constraint::Linear(c)) => form.push_constr(c),
            Some(Constraint::Convex(c)) => match c.kind().handler() {
                Some(Handler::Linear) => form.linearize(&c)?,
                Some(Handler::SecondOrder) => epigraph = Some(c),
                None => return Err(CvxError::UnsupportedCategory(c.kind())),
            },
            Some(other) => {
                return Err(CvxError::Internal(format!(
                    "objective epigraph produced a {}",
                    other.type_name()
                )))
            }
        }

        let mut qmat = Vec::new();
        for constr in self.cvx_constr.iter().chain(epigraph.iter()) {
            expand_convex(&mut form, constr, &mut qmat)?;
        }
        qmat.extend(self.cone_constr.iter().map(cone_record));

        let lp = self.base.assemble(form)?;
        SocProgram::new(lp, qmat)
    }

    /// Drop every stored constraint and the objective; variables are kept.
    pub fn reset(&mut self) {
        self.base.reset();
        self.cvx_constr.clear();
        self.cone_constr.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.primal.invalidate();
        self.linear_dual.invalidate();
        self.dual.invalidate();
    }
}
