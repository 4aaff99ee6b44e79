//! Linear model: variable allocation, constraint storage and linear
//! canonicalization.

use std::sync::Arc;

use nalgebra::DVector;

use super::dual::dualize;
use super::formulation::Formulation;
use super::program::LinearProgram;
use crate::cache::Cache;
use crate::constraints::{
    BoundKind, Bounds, Constraint, ConstraintTree, CvxConstr, LinConstr, Sense,
};
use crate::error::{CvxError, Result};
use crate::expr::{Affine, Convex, Handler, ModelId, Shape, VarType, Vars};
use crate::settings::Settings;
use crate::sparse::csc_vstack_all;

/// Objective expression of a model.
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    Affine(Affine),
    Convex(Convex),
}

impl Objective {
    fn model(&self) -> Option<ModelId> {
        match self {
            Objective::Affine(a) => a.model(),
            Objective::Convex(c) => c.model(),
        }
    }

    fn shape(&self) -> &Shape {
        match self {
            Objective::Affine(a) => a.shape(),
            Objective::Convex(c) => c.shape(),
        }
    }
}

impl From<Affine> for Objective {
    fn from(expr: Affine) -> Self {
        Objective::Affine(expr)
    }
}

impl From<&Affine> for Objective {
    fn from(expr: &Affine) -> Self {
        Objective::Affine(expr.clone())
    }
}

impl From<&Vars> for Objective {
    fn from(vars: &Vars) -> Self {
        Objective::Affine(vars.to_affine())
    }
}

impl From<Convex> for Objective {
    fn from(expr: Convex) -> Self {
        Objective::Convex(expr)
    }
}

/// Which canonical program to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Primal,
    Dual,
}

/// A constraint accepted by the linear store.
#[derive(Debug, Clone)]
pub(crate) enum BaseItem {
    Linear(LinConstr),
    Bounds(Bounds),
    Piecewise(CvxConstr),
}

/// Linear model.
///
/// Column 0 is the objective variable `t`; the canonical program minimizes
/// `t` subject to `t >= sign * objective`.
#[derive(Debug, Clone)]
pub struct LinearModel {
    pub(crate) id: ModelId,
    name: Option<String>,
    pub(crate) settings: Settings,
    pub(crate) vars: Vec<Vars>,
    pub(crate) lin_constr: Vec<LinConstr>,
    pub(crate) bounds: Vec<Bounds>,
    pub(crate) pwl_constr: Vec<CvxConstr>,
    pub(crate) objective: Option<(Objective, f64)>,
    primal: Cache<LinearProgram>,
    dual: Cache<LinearProgram>,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearModel {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let id = ModelId::new();
        LinearModel {
            id,
            name: None,
            settings,
            vars: vec![Vars::new(
                id,
                0,
                Shape::scalar(),
                VarType::Continuous,
                Some("obj".to_string()),
            )],
            lin_constr: Vec::new(),
            bounds: Vec::new(),
            pwl_constr: Vec::new(),
            objective: None,
            primal: Cache::Stale,
            dual: Cache::Stale,
        }
    }

    /// Set the model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of columns, including the objective variable.
    pub fn column_count(&self) -> usize {
        self.vars.last().map_or(0, Vars::end)
    }

    /// The objective variable (column 0).
    pub fn objective_var(&self) -> &Vars {
        &self.vars[0]
    }

    /// Declared variable blocks, the objective variable first.
    pub fn vars(&self) -> &[Vars] {
        &self.vars
    }

    pub fn lin_constr(&self) -> &[LinConstr] {
        &self.lin_constr
    }

    pub fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    /// Stored piecewise-linear convex constraints.
    pub fn pwl_constr(&self) -> &[CvxConstr] {
        &self.pwl_constr
    }

    /// Declare a block of decision variables of the default type.
    pub fn dvar(&mut self, shape: impl Into<Shape>) -> Vars {
        let vtype = self.settings.default_vtype;
        self.dvar_with(shape, vtype, None)
    }

    /// Declare a block of decision variables.
    pub fn dvar_with(
        &mut self,
        shape: impl Into<Shape>,
        vtype: VarType,
        name: Option<&str>,
    ) -> Vars {
        let vars = Vars::new(
            self.id,
            self.column_count(),
            shape.into(),
            vtype,
            name.map(str::to_string),
        );
        self.vars.push(vars.clone());
        self.invalidate();
        vars
    }

    /// Store constraints.
    ///
    /// Every constraint in the collection is validated before any is stored,
    /// so a failing call leaves the model unchanged.
    pub fn st(&mut self, constraints: impl Into<ConstraintTree>) -> Result<()> {
        let items = constraints
            .into()
            .flatten(self.settings.max_nesting_depth)?;
        let routed = items
            .into_iter()
            .map(|c| self.route(c))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                log::warn!("constraint rejected: {}", e);
                e
            })?;
        for item in routed {
            self.store(item);
        }
        self.invalidate();
        Ok(())
    }

    /// Classify a constraint for the linear store.
    pub(crate) fn route(&self, constr: Constraint) -> Result<BaseItem> {
        if let Constraint::Cone(_) | Constraint::ExpCone(_) = constr {
            return Err(CvxError::UnsupportedConstraint(constr.type_name()));
        }
        if constr.model() != Some(self.id) {
            return Err(CvxError::Ownership);
        }
        match constr {
            Constraint::Linear(c) => Ok(BaseItem::Linear(c)),
            Constraint::Bounds(c) => Ok(BaseItem::Bounds(c)),
            Constraint::Convex(c) => match c.kind().handler() {
                Some(Handler::Linear) => Ok(BaseItem::Piecewise(c)),
                _ => Err(CvxError::UnsupportedCategory(c.kind())),
            },
            other => Err(CvxError::UnsupportedConstraint(other.type_name())),
        }
    }

    pub(crate) fn store(&mut self, item: BaseItem) {
        match item {
            BaseItem::Linear(c) => self.lin_constr.push(c),
            BaseItem::Bounds(c) => self.bounds.push(c),
            BaseItem::Piecewise(c) => self.pwl_constr.push(c),
        }
    }

    /// Minimize an affine or piecewise-linear convex expression.
    pub fn min(&mut self, expr: impl Into<Objective>) -> Result<()> {
        self.set_objective(expr.into(), 1.0, &[Handler::Linear])
    }

    /// Maximize an affine or piecewise-linear concave expression.
    pub fn max(&mut self, expr: impl Into<Objective>) -> Result<()> {
        self.set_objective(expr.into(), -1.0, &[Handler::Linear])
    }

    /// Validate and store the objective; convex kinds must be expanded by
    /// one of `handlers`.
    pub(crate) fn set_objective(
        &mut self,
        objective: Objective,
        sign: f64,
        handlers: &[Handler],
    ) -> Result<()> {
        if let Some(model) = objective.model() {
            if model != self.id {
                return Err(CvxError::Ownership);
            }
        }
        if objective.shape().size() != 1 {
            return Err(CvxError::ShapeMismatch {
                expected: "()".to_string(),
                got: objective.shape().to_string(),
            });
        }
        if let Objective::Convex(c) = &objective {
            match c.kind().handler() {
                Some(h) if handlers.contains(&h) => {}
                _ => return Err(CvxError::UnsupportedCategory(c.kind())),
            }
            if c.is_convex() != (sign > 0.0) {
                let goal = if sign > 0.0 { "minimize" } else { "maximize" };
                return Err(CvxError::NotConvex(format!(
                    "cannot {} a {} {:?} expression",
                    goal,
                    if c.is_convex() { "convex" } else { "concave" },
                    c.kind()
                )));
            }
        }
        self.objective = Some((objective, sign));
        self.invalidate();
        Ok(())
    }

    /// `t >= sign * objective`, if an objective is set.
    pub(crate) fn objective_epigraph(&self) -> Result<Option<Constraint>> {
        let t = self.objective_var();
        let constr: Constraint = match &self.objective {
            None => return Ok(None),
            Some((Objective::Affine(a), sign)) => a.scale(*sign).le(t)?.into(),
            Some((Objective::Convex(c), sign)) => {
                let scaled = if *sign > 0.0 { c.clone() } else { c.neg() };
                scaled.le(t)?.into()
            }
        };
        Ok(Some(constr))
    }

    /// Linear canonicalization of the stored constraints plus everything
    /// collected in `form`.
    ///
    /// Stored rows come first in insertion order, then auxiliary rows; bounds
    /// are applied in insertion order after binaries are set to `[0, 1]`.
    pub(crate) fn assemble(&self, mut form: Formulation) -> Result<LinearProgram> {
        for constr in &self.pwl_constr {
            form.linearize(constr)?;
        }

        let n = form.column_count();
        let rows: Vec<&LinConstr> = self.lin_constr.iter().chain(&form.constraints).collect();
        if let Some(wide) = rows.iter().find(|c| c.linear().ncols() > n) {
            return Err(CvxError::Internal(format!(
                "constraint references column {} of {}",
                wide.linear().ncols() - 1,
                n
            )));
        }

        let linear = csc_vstack_all(rows.iter().copied().map(LinConstr::linear), n);
        let constants: Vec<f64> = rows
            .iter()
            .flat_map(|c| c.constant().iter().copied())
            .collect();
        let senses: Vec<Sense> = rows
            .iter()
            .flat_map(|c| std::iter::repeat(c.sense()).take(c.len()))
            .collect();

        let mut vtypes = Vec::with_capacity(n);
        for block in self.vars.iter().chain(&form.aux) {
            vtypes.extend(std::iter::repeat(block.vtype()).take(block.size()));
        }

        let mut upper = DVector::from_element(n, f64::INFINITY);
        let mut lower = DVector::from_element(n, f64::NEG_INFINITY);
        for (j, vtype) in vtypes.iter().enumerate() {
            if *vtype == VarType::Binary {
                upper[j] = 1.0;
                lower[j] = 0.0;
            }
        }
        for bound in self.bounds.iter().chain(&form.bounds) {
            for (j, value) in bound.iter() {
                if j >= n {
                    return Err(CvxError::IndexOutOfRange { index: j, size: n });
                }
                match bound.kind() {
                    BoundKind::Upper => upper[j] = value,
                    BoundKind::Lower => lower[j] = value,
                }
            }
        }

        let mut objective = DVector::zeros(n);
        if self.objective.is_some() {
            objective[0] = 1.0;
        }

        let program = LinearProgram {
            linear,
            constants: DVector::from_vec(constants),
            senses,
            vtypes,
            upper,
            lower,
            objective,
        };
        log::debug!(
            "canonical linear program: {} rows, {} columns, {} nonzeros",
            program.nrows(),
            program.ncols(),
            program.linear.nnz()
        );
        Ok(program)
    }

    fn build_primal(&self) -> Result<LinearProgram> {
        let mut form = Formulation::new(self.id, self.column_count());
        match self.objective_epigraph()? {
            None => {}
            Some(Constraint::Linear(c)) => form.push_constr(c),
            Some(Constraint::Convex(c)) => form.linearize(&c)?,
            Some(other) => {
                return Err(CvxError::Internal(format!(
                    "objective epigraph produced a {}",
                    other.type_name()
                )))
            }
        }
        self.assemble(form)
    }

    /// Build, or fetch from cache, the primal or dual linear program.
    pub fn do_math(&mut self, form: Form) -> Result<Arc<LinearProgram>> {
        match form {
            Form::Primal => {
                if let Some(program) = self.primal.get() {
                    log::trace!("primal linear program cache hit");
                    return Ok(program);
                }
                let program = self.build_primal()?;
                Ok(self.primal.set(program))
            }
            Form::Dual => {
                if let Some(program) = self.dual.get() {
                    log::trace!("dual linear program cache hit");
                    return Ok(program);
                }
                let primal = self.do_math(Form::Primal)?;
                let program = dualize(&primal)?;
                Ok(self.dual.set(program))
            }
        }
    }

    /// Shorthand for `do_math(Form::Primal)`.
    pub fn canonicalize(&mut self) -> Result<Arc<LinearProgram>> {
        self.do_math(Form::Primal)
    }

    /// Shorthand for `do_math(Form::Dual)`.
    pub fn dual(&mut self) -> Result<Arc<LinearProgram>> {
        self.do_math(Form::Dual)
    }

    /// Drop every stored constraint and the objective; variables are kept.
    pub fn reset(&mut self) {
        self.lin_constr.clear();
        self.bounds.clear();
        self.pwl_constr.clear();
        self.objective = None;
        self.invalidate();
    }

    pub(crate) fn invalidate(&mut self) {
        self.primal.invalidate();
        self.dual.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{abs, norm, sumsqr, Degree};

    #[test]
    fn test_objective_var_is_column_zero() {
        let mut m = LinearModel::new();
        let x = m.dvar(3);
        assert_eq!(m.objective_var().first(), 0);
        assert_eq!(x.first(), 1);
        assert_eq!(m.column_count(), 4);
    }

    #[test]
    fn test_st_rejects_foreign_constraints() {
        let mut m = LinearModel::new();
        let mut other = LinearModel::new();
        let x = m.dvar(2);
        let y = other.dvar(2);
        let err = m.st(vec![x.le(1.0).unwrap(), y.le(1.0).unwrap()]);
        assert_eq!(err, Err(CvxError::Ownership));
        assert!(m.lin_constr.is_empty());
    }

    #[test]
    fn test_st_rejects_cone_kinds() {
        let mut m = LinearModel::new();
        let x = m.dvar(2);
        let t = m.dvar(1);
        assert_eq!(
            m.st(sumsqr(&x).le(&t).unwrap()),
            Err(CvxError::UnsupportedCategory(crate::expr::ConvexKind::SumSquares))
        );
    }

    #[test]
    fn test_canonicalize_rows_and_bounds() {
        let mut m = LinearModel::new();
        let x = m.dvar(2);
        let b = m.dvar_with(1, VarType::Binary, Some("b"));
        m.st(vec![x.le(vec![1.0, 2.0]).unwrap()]).unwrap();
        m.st(x.lower(vec![-1.0]).unwrap()).unwrap();
        m.st(abs(&x).le(5.0).unwrap()).unwrap();
        m.min(&x.to_affine().sum()).unwrap();

        let lp = m.canonicalize().unwrap();
        assert_eq!(lp.ncols(), 4);
        // 2 stored rows, 1 epigraph row, 4 rows from |x| <= 5
        assert_eq!(lp.nrows(), 7);
        assert_eq!(lp.constants[0], 1.0);
        assert_eq!(lp.lower[1], -1.0);
        assert_eq!(lp.upper[b.first()], 1.0);
        assert_eq!(lp.lower[b.first()], 0.0);
        assert_eq!(lp.vtypes[b.first()], VarType::Binary);
        assert_eq!(lp.objective[0], 1.0);
    }

    #[test]
    fn test_cache_and_invalidation() {
        let mut m = LinearModel::new();
        let x = m.dvar(2);
        m.st(x.ge(0.0).unwrap()).unwrap();
        let first = m.canonicalize().unwrap();
        let again = m.canonicalize().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        m.st(x.le(1.0).unwrap()).unwrap();
        let changed = m.canonicalize().unwrap();
        assert!(!Arc::ptr_eq(&first, &changed));
        assert_eq!(changed.nrows(), 4);
    }

    #[test]
    fn test_objective_curvature() {
        let mut m = LinearModel::new();
        let x = m.dvar(2);
        assert!(matches!(
            m.max(norm(&x, Degree::Inf)),
            Err(CvxError::NotConvex(_))
        ));
        assert!(m.max(norm(&x, Degree::Inf).neg()).is_ok());
        assert!(matches!(
            m.min(norm(&x, Degree::Two)),
            Err(CvxError::UnsupportedCategory(_))
        ));
    }

    #[test]
    fn test_dual_of_binary_model() {
        let mut m = LinearModel::new();
        m.dvar_with(2, VarType::Binary, None);
        assert!(matches!(m.dual(), Err(CvxError::DualUndefined(_))));
    }

    #[test]
    fn test_reset_keeps_variables() {
        let mut m = LinearModel::new();
        let x = m.dvar(2);
        m.st(x.le(1.0).unwrap()).unwrap();
        m.reset();
        let lp = m.canonicalize().unwrap();
        assert_eq!(lp.nrows(), 0);
        assert_eq!(lp.ncols(), 3);
    }
}
