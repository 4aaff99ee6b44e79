//! Tests for dual derivation of linear and second-order cone models.

use std::collections::HashSet;
use std::sync::Arc;

use cvxsocp::prelude::*;
use cvxsocp::sparse::csc_to_dense;
use float_eq::assert_float_eq;

const TOL: f64 = 1e-12;

fn scenario() -> Model {
    let mut m = Model::new();
    let x = m.dvar(2);
    let t = m.dvar(1);
    m.st(sumsqr(&x).le(&t).unwrap()).unwrap();
    m
}

// ============================================================================
// Linear duals
// ============================================================================

#[test]
fn test_linear_dual_shapes() {
    // min t s.t. t >= x1 + x2, x1 + x2 == 1, x >= 0, x2 <= 4
    let mut m = LinearModel::new();
    let x = m.dvar(2);
    m.st(vec![
        Constraint::from(x.to_affine().sum().eq(1.0).unwrap()),
        Constraint::from(x.nonneg()),
        Constraint::from(x.get(1).unwrap().to_affine().le(4.0).unwrap()),
    ])
    .unwrap();
    m.min(&x.to_affine().sum()).unwrap();

    let primal = m.canonicalize().unwrap();
    let dual = m.dual().unwrap();
    assert_eq!(dual.nrows(), primal.ncols());
    assert_eq!(dual.ncols(), primal.nrows());

    // t is free, x is non-negative
    assert_eq!(dual.senses, vec![Sense::Eq, Sense::Le, Sense::Le]);
    assert_float_eq!(dual.constants[0], 1.0, abs <= TOL);
    // -b
    let b: Vec<f64> = primal.constants.iter().map(|v| -v).collect();
    assert_eq!(dual.objective.iter().copied().collect::<Vec<_>>(), b);
    // equality rows are free, inequality rows non-positive
    for (i, sense) in primal.senses.iter().enumerate() {
        let expected = if *sense == Sense::Le { 0.0 } else { f64::INFINITY };
        assert_eq!(dual.upper[i], expected);
        assert!(dual.lower[i].is_infinite());
    }
}

#[test]
fn test_linear_dual_transposes() {
    let mut m = LinearModel::new();
    let x = m.dvar(2);
    let a = nalgebra::DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    m.st(x.to_affine().matmul_left(&a).unwrap().le(vec![1.0, 1.0]).unwrap())
        .unwrap();

    let primal = m.canonicalize().unwrap();
    let dual = m.dual().unwrap();
    assert_eq!(csc_to_dense(&dual.linear), csc_to_dense(&primal.linear).transpose());
}

#[test]
fn test_dual_cached() {
    let mut m = LinearModel::new();
    let x = m.dvar(2);
    m.st(x.le(1.0).unwrap()).unwrap();
    let first = m.do_math(Form::Dual).unwrap();
    let second = m.do_math(Form::Dual).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_integer_model_has_no_dual() {
    let mut m = Model::new();
    let x = m.dvar_with(2, VarType::Integer, Some("n"));
    let t = m.dvar(1);
    m.st(sumsqr(&x).le(&t).unwrap()).unwrap();
    assert!(m.canonicalize().is_ok());
    assert!(matches!(m.derive_dual(), Err(CvxError::DualUndefined(_))));
}

// ============================================================================
// Cone duals
// ============================================================================

#[test]
fn test_no_records_gives_linear_dual() {
    let mut m = Model::new();
    let x = m.dvar(3);
    m.st(vec![x.ge(0.0).unwrap(), x.to_affine().sum().le(1.0).unwrap()])
        .unwrap();

    let dual = m.derive_dual().unwrap();
    let linear_dual = m.linear_dual().unwrap();
    assert!(dual.qmat.is_empty());
    assert_eq!(dual.lp, *linear_dual);
}

#[test]
fn test_scenario_dual() {
    let mut m = scenario();
    let primal = m.canonicalize().unwrap();
    let linear_dual = m.linear_dual().unwrap();
    let dual = m.derive_dual().unwrap();

    assert_eq!(dual.qmat.len(), primal.qmat.len());

    // identity rows 4..8 are removed, rows 0..4 remain in order
    assert_eq!(dual.nrows(), 4);
    let full = csc_to_dense(&linear_dual.linear);
    let sliced = csc_to_dense(&dual.linear);
    for r in 0..4 {
        assert_eq!(sliced.row(r), full.row(r));
        assert_eq!(dual.senses[r], linear_dual.senses[r]);
        assert_float_eq!(dual.constants[r], linear_dual.constants[r], abs <= TOL);
    }

    // primal columns a3, a1, a2 appear in equality rows 3, 0, 1, 2
    assert_eq!(dual.qmat, vec![vec![3, 0, 1, 2]]);
    assert_eq!(dual.upper[3], 0.0);
    assert_eq!(dual.upper[0], f64::INFINITY);
}

#[test]
fn test_cone_only_model_dual() {
    let mut m = Model::new();
    let x = m.dvar(2);
    let t = m.dvar(1);
    m.st(ConeConstr::new(&x.all(), &t.get(0).unwrap()).unwrap())
        .unwrap();

    let primal = m.canonicalize().unwrap();
    assert_eq!(primal.nrows(), 0);
    assert_eq!(primal.qmat, vec![vec![3, 1, 2]]);

    // no row references the cone columns, so the dual cone has no members
    let dual = m.do_math(Form::Dual).unwrap();
    assert_eq!(dual.qmat.len(), 1);
    assert!(dual.qmat[0].is_empty());
    // only the row of the objective column survives
    assert_eq!(dual.nrows(), 1);
    assert_eq!(dual.showqc().nrows(), 1);
}

#[test]
fn test_dual_preserves_record_count() {
    let mut m = Model::new();
    let x = m.dvar(3);
    let t = m.dvar(3);
    m.st(vec![
        Constraint::from(square(&x).le(&t).unwrap()),
        Constraint::from(norm(&x, Degree::Two).le(t.get(0).unwrap().to_affine()).unwrap()),
        Constraint::from(x.le(2.0).unwrap()),
    ])
    .unwrap();

    let primal = m.canonicalize().unwrap();
    let dual = m.derive_dual().unwrap();
    assert_eq!(dual.qmat.len(), primal.qmat.len());

    let identity: HashSet<usize> = primal.qmat.iter().flatten().copied().collect();
    assert_eq!(dual.nrows(), primal.ncols() - identity.len());
    for record in &dual.qmat {
        assert!(record.iter().all(|&i| i < dual.ncols()));
    }
}

#[test]
fn test_dual_cache_follows_changes() {
    let mut m = scenario();
    let first = m.do_math(Form::Dual).unwrap();
    let again = m.do_math(Form::Dual).unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    let x = m.dvar(2);
    m.st(x.le(1.0).unwrap()).unwrap();
    let changed = m.do_math(Form::Dual).unwrap();
    assert!(!Arc::ptr_eq(&first, &changed));
    assert_eq!(changed.qmat.len(), 1);
}
