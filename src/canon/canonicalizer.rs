//! Expression canonicalization.
//!
//! Canonicalization reduces an expression tree to an affine expression plus
//! the auxiliary constraints needed to keep it equivalent. The affine atoms
//! reduce to themselves with their children canonicalized; the result's
//! curvature is always constant or affine.

use std::collections::HashMap;
use std::sync::Arc;

use crate::atoms::affine::{build_add, build_index, build_mul, build_neg, build_sub};
use crate::constraints::Constraint;
use crate::error::Result;
use crate::expr::{Expr, MulNode, Side};

/// Result of canonicalizing an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonResult {
    /// The affine expression.
    pub expr: Expr,
    /// Auxiliary constraints, in left-to-right order of the tree.
    pub constraints: Vec<Constraint>,
}

impl CanonResult {
    pub fn into_parts(self) -> (Expr, Vec<Constraint>) {
        (self.expr, self.constraints)
    }
}

/// Canonicalize an expression.
#[tracing::instrument(level = "debug", skip_all, fields(shape = %expr.shape()))]
pub fn canonicalize(expr: &Expr) -> Result<CanonResult> {
    let mut ctx = CanonContext::new();
    let canon = ctx.canonicalize_expr(expr)?;
    debug_assert!(
        canon.curvature().is_affine(),
        "canonical form must be affine, got {}",
        canon.curvature()
    );
    tracing::debug!(constraints = ctx.constraints.len(), "canonicalized");
    Ok(CanonResult {
        expr: canon,
        constraints: ctx.constraints,
    })
}

impl Expr {
    /// Reduce to `(affine expression, auxiliary constraints)`.
    pub fn canonicalize(&self) -> Result<CanonResult> {
        canonicalize(self)
    }
}

/// Context for canonicalization, collecting auxiliary constraints.
struct CanonContext {
    constraints: Vec<Constraint>,
    /// Reduced form of each shared child already visited, keyed by address.
    /// The input tree owns every key for the whole pass, so addresses stay
    /// unique.
    reduced: HashMap<*const Expr, Arc<Expr>>,
}

impl CanonContext {
    fn new() -> Self {
        CanonContext {
            constraints: Vec::new(),
            reduced: HashMap::new(),
        }
    }

    /// Canonicalize a shared child, reusing the `Arc` for leaves.
    ///
    /// A child reachable along several paths is reduced once, and every
    /// parent gets the same reduced `Arc`.
    fn canonicalize_child(&mut self, child: &Arc<Expr>) -> Result<Arc<Expr>> {
        if matches!(
            child.as_ref(),
            Expr::Variable(_) | Expr::Constant(_) | Expr::Parameter(_)
        ) {
            return Ok(Arc::clone(child));
        }
        let key = Arc::as_ptr(child);
        if let Some(done) = self.reduced.get(&key) {
            return Ok(Arc::clone(done));
        }
        let reduced = Arc::new(self.canonicalize_expr(child)?);
        self.reduced.insert(key, Arc::clone(&reduced));
        Ok(reduced)
    }

    fn canonicalize_expr(&mut self, expr: &Expr) -> Result<Expr> {
        tracing::trace!(curvature = %expr.curvature(), "canonicalize node");
        match expr {
            // Leaves are already canonical
            Expr::Variable(_) | Expr::Constant(_) | Expr::Parameter(_) => Ok(expr.clone()),

            Expr::Add(node) => {
                let lhs = self.canonicalize_child(&node.lhs)?;
                let rhs = self.canonicalize_child(&node.rhs)?;
                build_add(lhs, rhs)
            }
            Expr::Sub(node) => {
                let lhs = self.canonicalize_child(&node.lhs)?;
                let rhs = self.canonicalize_child(&node.rhs)?;
                build_sub(lhs, rhs)
            }
            Expr::Neg(node) => Ok(build_neg(self.canonicalize_child(&node.arg)?)),
            Expr::Mul(node) => self.canonicalize_mul(node),
            Expr::Index(node) => {
                // Bounds are checked again against the reduced base.
                let base = self.canonicalize_child(&node.base)?;
                build_index(base, node.row, node.col)
            }
        }
    }

    /// The coefficient is constant and stays on the side it was written on;
    /// only the other factor is reduced.
    fn canonicalize_mul(&mut self, node: &MulNode) -> Result<Expr> {
        let (coeff, arg) = node.operands();
        let arg = self.canonicalize_child(arg)?;
        match node.coeff_side() {
            Side::Left => build_mul(Arc::clone(coeff), arg),
            Side::Right => build_mul(arg, Arc::clone(coeff)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::Curvature;
    use crate::expr::{constant, constant_columns, constant_vec, named_variable, parameter, variable};

    #[test]
    fn test_canonicalize_variable() {
        let x = variable(5).unwrap();
        let result = canonicalize(&x).unwrap();
        assert!(result.constraints.is_empty());
        assert_eq!(result.expr, x);
    }

    #[test]
    fn test_canonicalize_leaves() {
        let c = constant(2.0);
        assert_eq!(c.canonicalize().unwrap().into_parts(), (c.clone(), vec![]));
        let p = parameter("p", 2).unwrap();
        assert_eq!(p.canonicalize().unwrap().expr, p);
    }

    #[test]
    fn test_canonicalize_affine_is_identity() {
        let x = named_variable("x", 2).unwrap();
        let c = constant_vec(vec![2.0, 2.0]).unwrap();
        let e = ((&x + &c).unwrap() - (-&x)).unwrap();
        let result = e.canonicalize().unwrap();
        assert_eq!(result.expr, e);
        assert_eq!(result.expr.name(), e.name());
        assert!(result.constraints.is_empty());
    }

    #[test]
    fn test_canonicalize_mul_keeps_coefficient_side() {
        let x = named_variable("x", 2).unwrap();
        let row = constant_columns(vec![vec![2.0], vec![2.0]]).unwrap();
        let left = (&row * &x).unwrap();
        assert_eq!(left.canonicalize().unwrap().expr, left);
        assert_eq!(left.shape(), (1, 1));

        let right = (&x * 2.0).unwrap();
        let canon = right.canonicalize().unwrap().expr;
        assert_eq!(canon, right);
        assert_eq!(canon.name(), "x * 2");
    }

    #[test]
    fn test_canonicalize_index() {
        let x = named_variable("x", 2).unwrap();
        let e = (&x + 1.0).unwrap().index(1, 0).unwrap();
        let canon = e.canonicalize().unwrap().expr;
        assert_eq!(canon.name(), "x + 1[1,0]");
        assert_eq!(canon.curvature(), Curvature::Affine);
    }

    #[test]
    fn test_canonicalize_nan_constant() {
        let c = constant(f64::NAN);
        assert_eq!(c.canonicalize().unwrap().into_parts(), (c.clone(), vec![]));
    }

    #[test]
    fn test_shared_children_reduced_once() {
        let x = named_variable("x", 2).unwrap();
        // Each level references the previous one twice; without sharing the
        // walk would visit 2^40 nodes.
        let mut e = Arc::new((&x + 1.0).unwrap());
        for _ in 0..40 {
            e = Arc::new(build_add(Arc::clone(&e), Arc::clone(&e)).unwrap());
        }
        let canon = e.canonicalize().unwrap().expr;
        assert_eq!(canon.shape(), (2, 1));
        let Expr::Add(node) = &canon else {
            panic!("Expected Add");
        };
        assert!(Arc::ptr_eq(node.lhs(), node.rhs()));
    }

    #[test]
    fn test_canonical_form_is_affine() {
        let x = variable((2, 2)).unwrap();
        let t = constant_columns(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let e = (((&t * &x).unwrap() - 1.0).unwrap() * 0.5).unwrap();
        let result = e.canonicalize().unwrap();
        assert!(result.expr.curvature().is_affine());
        assert_eq!(result.expr.shape(), e.shape());
    }
}
