//! Nested constraint collections.

use super::constraint::{Bounds, ConeConstr, Constraint, CvxConstr, ExpConeConstr, LinConstr};
use crate::error::{CvxError, Result};

/// A single constraint or an ordered collection of constraint trees.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintTree {
    Leaf(Constraint),
    Group(Vec<ConstraintTree>),
}

impl ConstraintTree {
    /// Flatten into constraints in depth-first order.
    ///
    /// Groups nested more than `max_depth` levels below the root fail with
    /// [`CvxError::NestingTooDeep`]. The walk uses an explicit stack.
    pub fn flatten(self, max_depth: usize) -> Result<Vec<Constraint>> {
        let mut out = Vec::new();
        let mut stack = vec![(self, 0usize)];

        while let Some((tree, depth)) = stack.pop() {
            match tree {
                ConstraintTree::Leaf(c) => out.push(c),
                ConstraintTree::Group(children) => {
                    if depth >= max_depth {
                        return Err(CvxError::NestingTooDeep { limit: max_depth });
                    }
                    stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
                }
            }
        }

        Ok(out)
    }
}

impl From<Constraint> for ConstraintTree {
    fn from(c: Constraint) -> Self {
        ConstraintTree::Leaf(c)
    }
}

macro_rules! impl_from_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ConstraintTree {
                fn from(c: $ty) -> Self {
                    ConstraintTree::Leaf(c.into())
                }
            }
        )*
    };
}

impl_from_leaf!(LinConstr, Bounds, CvxConstr, ConeConstr, ExpConeConstr);

impl<T: Into<ConstraintTree>> From<Vec<T>> for ConstraintTree {
    fn from(items: Vec<T>) -> Self {
        ConstraintTree::Group(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConstraintTree>, const N: usize> From<[T; N]> for ConstraintTree {
    fn from(items: [T; N]) -> Self {
        ConstraintTree::Group(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Affine;

    fn leaf(rhs: f64) -> ConstraintTree {
        Affine::scalar(0.0).le(rhs).unwrap().into()
    }

    fn rhs_of(c: &Constraint) -> f64 {
        match c {
            Constraint::Linear(l) => l.constant()[0],
            _ => panic!("Expected linear constraint"),
        }
    }

    #[test]
    fn test_flatten_preserves_order() {
        let tree = ConstraintTree::Group(vec![
            leaf(1.0),
            ConstraintTree::Group(vec![leaf(2.0), ConstraintTree::Group(vec![leaf(3.0)])]),
            leaf(4.0),
        ]);
        let flat = tree.flatten(8).unwrap();
        let rhs: Vec<f64> = flat.iter().map(rhs_of).collect();
        assert_eq!(rhs, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_flatten_depth_limit() {
        let mut tree = leaf(1.0);
        for _ in 0..5 {
            tree = ConstraintTree::Group(vec![tree]);
        }
        assert!(tree.clone().flatten(5).is_ok());
        assert_eq!(
            tree.flatten(4),
            Err(CvxError::NestingTooDeep { limit: 4 })
        );
    }

    #[test]
    fn test_from_nested_vec() {
        let tree: ConstraintTree = vec![vec![leaf(1.0)], vec![leaf(2.0), leaf(3.0)]].into();
        assert_eq!(tree.flatten(2).unwrap().len(), 3);
    }
}
