//! Second-Order Cone Canonicalization Example
//!
//! This example builds a small constrained least-squares model:
//!
//! minimize    ||A x - b||_2
//! subject to  sum(x) == 1, x >= 0, sum(y^2) <= 0.5 with y = x[0..2]
//!
//! and prints its canonical primal and dual cone programs.

use cvxsocp::prelude::*;

fn main() {
    env_logger::init();

    println!("=== Second-Order Cone Canonicalization ===\n");

    let mut model = Model::new().with_name("least squares");
    let x = model.dvar_with(3, VarType::Continuous, Some("x"));

    // Data
    let a = nalgebra::DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 0.0, 0.0, 1.0, -1.0]);
    let b = vec![1.0, 0.5];

    // Residual A x - b
    let residual = x
        .to_affine()
        .matmul_left(&a)
        .and_then(|r| r.sub(b))
        .expect("Failed to build residual");

    model
        .st(vec![
            Constraint::from(x.to_affine().sum().eq(1.0).expect("Failed to build constraint")),
            Constraint::from(x.nonneg()),
            Constraint::from(
                sumsqr(x.select([0, 1]).expect("Index out of range").to_affine())
                    .le(0.5)
                    .expect("Failed to build constraint"),
            ),
        ])
        .expect("Failed to add constraints");
    model
        .min(norm(&residual, Degree::Two))
        .expect("Failed to set objective");

    // Primal
    let primal = model.canonicalize().expect("Failed to canonicalize");
    println!("{}", primal);
    println!("Linear constraints:");
    println!("{:.2}", primal.show());
    println!("Cone constraints:");
    println!("{:.0}", primal.showqc());

    // Dual
    let dual = model.derive_dual().expect("Failed to derive dual");
    println!("{}", dual);
    println!("Dual cone constraints:");
    println!("{:.0}", dual.showqc());
}
