//! Dual of a second-order cone program.
//!
//! The linear dual of the primal system has one row per primal column. Rows
//! of columns that appear in a cone record are the cone's identity rows: they
//! are dropped from the linear part, and the cone is rebuilt over the dual
//! columns those rows reference.

use std::collections::HashSet;

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use super::program::SocProgram;
use crate::error::Result;
use crate::lp::LinearProgram;
use crate::sparse::{csc_select_rows, csr_row_pattern};

/// Dual cone program of `primal`, given the linear dual of `primal.lp`.
pub fn derive_dual(primal: &SocProgram, linear_dual: &LinearProgram) -> Result<SocProgram> {
    if primal.qmat.is_empty() {
        return SocProgram::new(linear_dual.clone(), Vec::new());
    }

    let identity: HashSet<usize> = primal.qmat.iter().flatten().copied().collect();
    let retained: Vec<usize> = (0..linear_dual.nrows())
        .filter(|i| !identity.contains(i))
        .collect();

    let rows = CsrMatrix::from(&linear_dual.linear);
    let mut upper = linear_dual.upper.clone();
    let mut qmat = Vec::with_capacity(primal.qmat.len());
    for record in &primal.qmat {
        if let Some(&bound) = record.first() {
            for j in csr_row_pattern(&rows, bound) {
                upper[j] = 0.0;
            }
        }
        qmat.push(
            record
                .iter()
                .flat_map(|&i| csr_row_pattern(&rows, i))
                .collect::<Vec<_>>(),
        );
    }

    log::debug!(
        "dual cone program: {} of {} dual rows kept, {} cone records",
        retained.len(),
        linear_dual.nrows(),
        qmat.len()
    );

    let lp = LinearProgram {
        linear: csc_select_rows(&linear_dual.linear, &retained),
        constants: DVector::from_iterator(
            retained.len(),
            retained.iter().map(|&i| linear_dual.constants[i]),
        ),
        senses: retained.iter().map(|&i| linear_dual.senses[i]).collect(),
        vtypes: linear_dual.vtypes.clone(),
        upper,
        lower: linear_dual.lower.clone(),
        objective: linear_dual.objective.clone(),
    };
    SocProgram::with_records(lp, qmat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Sense;
    use crate::expr::VarType;
    use crate::lp::dualize;
    use crate::sparse::{csc_from_triplets, csc_to_dense};

    /// min x0  s.t.  x0 - x1 == 0,  x2 == 1,  cone [x0, x2]
    fn primal() -> SocProgram {
        let lp = LinearProgram {
            linear: csc_from_triplets(2, 3, vec![0, 0, 1], vec![0, 1, 2], vec![1.0, -1.0, 1.0]),
            constants: DVector::from_vec(vec![0.0, 1.0]),
            senses: vec![Sense::Eq, Sense::Eq],
            vtypes: vec![VarType::Continuous; 3],
            upper: DVector::from_element(3, f64::INFINITY),
            lower: DVector::from_element(3, f64::NEG_INFINITY),
            objective: DVector::from_vec(vec![1.0, 0.0, 0.0]),
        };
        SocProgram::new(lp, vec![vec![0, 2]]).unwrap()
    }

    #[test]
    fn test_no_records_keeps_linear_dual() {
        let program = SocProgram::new(primal().lp.clone(), Vec::new()).unwrap();
        let linear_dual = dualize(&program.lp).unwrap();
        let dual = derive_dual(&program, &linear_dual).unwrap();
        assert_eq!(dual.lp, linear_dual);
        assert!(dual.qmat.is_empty());
    }

    #[test]
    fn test_identity_rows_removed() {
        let primal = primal();
        let linear_dual = dualize(&primal.lp).unwrap();
        assert_eq!(linear_dual.nrows(), 3);

        let dual = derive_dual(&primal, &linear_dual).unwrap();
        // only the row of x1 survives
        assert_eq!(dual.nrows(), 1);
        assert_eq!(csc_to_dense(&dual.linear)[(0, 0)], -1.0);
        assert_eq!(dual.constants.as_slice(), &[0.0]);
        assert_eq!(dual.ncols(), linear_dual.ncols());

        // dual row 0 references y0, dual row 2 references y1
        assert_eq!(dual.qmat, vec![vec![0, 1]]);
        assert_eq!(dual.upper[0], 0.0);
        assert_eq!(dual.upper[1], f64::INFINITY);
    }

    #[test]
    fn test_record_count_preserved() {
        let mut primal = primal();
        primal.qmat.push(vec![1, 0]);
        let linear_dual = dualize(&primal.lp).unwrap();
        let dual = derive_dual(&primal, &linear_dual).unwrap();
        assert_eq!(dual.qmat.len(), 2);
        assert_eq!(dual.nrows(), 0);
    }

    #[test]
    fn test_unreferenced_cone_gives_empty_record() {
        // no rows at all: every dual row is empty
        let lp = LinearProgram {
            linear: csc_from_triplets(0, 3, vec![], vec![], vec![]),
            constants: DVector::zeros(0),
            senses: Vec::new(),
            vtypes: vec![VarType::Continuous; 3],
            upper: DVector::from_element(3, f64::INFINITY),
            lower: DVector::from_element(3, f64::NEG_INFINITY),
            objective: DVector::zeros(3),
        };
        let primal = SocProgram::new(lp, vec![vec![2, 0, 1]]).unwrap();
        let linear_dual = dualize(&primal.lp).unwrap();
        let dual = derive_dual(&primal, &linear_dual).unwrap();
        assert_eq!(dual.qmat, vec![Vec::<usize>::new()]);
        assert_eq!(dual.nrows(), 0);
    }
}
