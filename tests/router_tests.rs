//! Tests for constraint routing: ownership, categories and collections.

use std::sync::Arc;

use cvxsocp::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_foreign_constraint_rejected() {
    init();
    let mut m = Model::new();
    let mut other = Model::new();
    let x = m.dvar(2);
    let y = other.dvar(2);
    let t = other.dvar(1);
    m.st(x.le(1.0).unwrap()).unwrap();
    let before = m.canonicalize().unwrap();
    let dual_before = m.derive_dual().unwrap();

    assert_eq!(m.st(sumsqr(&y).le(&t).unwrap()), Err(CvxError::Ownership));
    assert_eq!(m.st(y.ge(0.0).unwrap()), Err(CvxError::Ownership));
    assert_eq!(
        m.st(ConeConstr::new(&y.all(), &t.get(0).unwrap()).unwrap()),
        Err(CvxError::Ownership)
    );

    assert!(m.cvx_constr().is_empty());
    assert!(m.cone_constr().is_empty());
    assert!(Arc::ptr_eq(&before, &m.canonicalize().unwrap()));
    assert!(Arc::ptr_eq(&dual_before, &m.derive_dual().unwrap()));
}

#[test]
fn test_constant_constraint_has_no_owner() {
    let mut m = Model::new();
    let c = Affine::scalar(1.0).le(2.0).unwrap();
    assert_eq!(m.st(c), Err(CvxError::Ownership));
}

#[test]
fn test_mixed_models_in_expression() {
    let mut m = Model::new();
    let mut other = Model::new();
    let x = m.dvar(2);
    let y = other.dvar(2);
    assert_eq!(x.to_affine().add(&y), Err(CvxError::Ownership));
}

// ============================================================================
// Categories
// ============================================================================

#[test]
fn test_exp_category_rejected() {
    init();
    let mut m = Model::new();
    let x = m.dvar(3);
    let t = m.dvar(1);
    m.st(sumsqr(&x).le(&t).unwrap()).unwrap();
    let before = m.canonicalize().unwrap();
    let dual_before = m.derive_dual().unwrap();

    let result = m.st(exp(&x).le(1.0).unwrap());
    assert_eq!(result, Err(CvxError::UnsupportedCategory(ConvexKind::Exp)));
    assert_eq!(m.cvx_constr().len(), 1);
    assert!(Arc::ptr_eq(&before, &m.canonicalize().unwrap()));
    assert!(Arc::ptr_eq(&dual_before, &m.derive_dual().unwrap()));
}

#[test]
fn test_exp_cone_constraint_rejected() {
    let mut m = Model::new();
    let x = m.dvar(3);
    let c = ExpConeConstr::new(&x.get(0).unwrap(), &x.get(1).unwrap(), &x.get(2).unwrap())
        .unwrap();
    assert!(matches!(
        m.st(c),
        Err(CvxError::UnsupportedConstraint(_))
    ));
}

#[test]
fn test_piecewise_kinds_go_to_linear_store() {
    let mut m = Model::new();
    let x = m.dvar(3);
    let t = m.dvar(1);
    m.st(vec![
        abs(&x).le(1.0).unwrap(),
        norm(&x, Degree::One).le(&t).unwrap(),
        norm(&x, Degree::Inf).le(&t).unwrap(),
    ])
    .unwrap();
    assert!(m.cvx_constr().is_empty());

    let program = m.canonicalize().unwrap();
    assert!(program.qmat.is_empty());
    // abs: 2 x 3 rows, norm1: 3 + 3 + 1 rows, norm_inf: 2 x 3 rows
    assert_eq!(program.nrows(), 19);
}

#[test]
fn test_cone_kinds_go_to_convex_store() {
    let mut m = Model::new();
    let x = m.dvar(3);
    let t = m.dvar(1);
    m.st(vec![
        norm(&x, Degree::Two).le(&t).unwrap(),
        square(&x).le(1.0).unwrap(),
        sumsqr(&x).le(&t).unwrap(),
    ])
    .unwrap();
    let kinds: Vec<ConvexKind> = m.cvx_constr().iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![ConvexKind::Norm2, ConvexKind::Square, ConvexKind::SumSquares]
    );
}

#[test]
fn test_linear_model_rejects_cones() {
    let mut m = LinearModel::new();
    let x = m.dvar(2);
    let t = m.dvar(1);
    assert_eq!(
        m.st(norm(&x, Degree::Two).le(&t).unwrap()),
        Err(CvxError::UnsupportedCategory(ConvexKind::Norm2))
    );
    assert!(matches!(
        m.st(ConeConstr::new(&x.all(), &t.get(0).unwrap()).unwrap()),
        Err(CvxError::UnsupportedConstraint(_))
    ));
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_nested_collections_in_order() {
    let mut m = Model::new();
    let x = m.dvar(2);
    let t = m.dvar(1);
    let inner = vec![
        Constraint::from(norm(&x, Degree::Two).le(&t).unwrap()),
        Constraint::from(x.le(3.0).unwrap()),
    ];
    let tree = ConstraintTree::Group(vec![
        ConstraintTree::from(sumsqr(&x).le(&t).unwrap()),
        ConstraintTree::from(inner),
        ConstraintTree::from([square(&x).le(2.0).unwrap()]),
    ]);
    m.st(tree).unwrap();

    let kinds: Vec<ConvexKind> = m.cvx_constr().iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![ConvexKind::SumSquares, ConvexKind::Norm2, ConvexKind::Square]
    );
    assert_eq!(m.base().lin_constr().len(), 1);
}

#[test]
fn test_nesting_limit() {
    let mut m = Model::with_settings(Settings::default().max_nesting_depth(2));
    let x = m.dvar(2);

    let deep: ConstraintTree = vec![vec![vec![x.le(1.0).unwrap()]]].into();
    assert_eq!(m.st(deep), Err(CvxError::NestingTooDeep { limit: 2 }));

    let shallow: ConstraintTree = vec![vec![x.le(1.0).unwrap()]].into();
    assert!(m.st(shallow).is_ok());
}

#[test]
fn test_failing_item_rolls_back_whole_collection() {
    let mut m = Model::new();
    let x = m.dvar(2);
    let t = m.dvar(1);
    let result = m.st(vec![
        Constraint::from(x.le(1.0).unwrap()),
        Constraint::from(sumsqr(&x).le(&t).unwrap()),
        Constraint::from(exp(&t).le(1.0).unwrap()),
    ]);
    assert!(result.is_err());
    assert!(m.cvx_constr().is_empty());
    assert_eq!(m.canonicalize().unwrap().nrows(), 0);
}

#[test]
fn test_default_vtype_setting() {
    let mut m = Model::with_settings(Settings::default().default_vtype(VarType::Integer));
    let x = m.dvar(2);
    assert_eq!(x.vtype(), VarType::Integer);
    assert_eq!(m.objective_var().vtype(), VarType::Continuous);
}
