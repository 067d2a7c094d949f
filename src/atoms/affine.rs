//! Affine atoms and operator overloading.
//!
//! Every compound node is built here. Each builder checks the operator's
//! legality, computes the result shape and curvature once, and either returns
//! a complete node or an error; nothing half-built escapes.
//!
//! The arithmetic operators are the construction API. Binary operators return
//! `Result<Expr>`, so chains read `((&x + 2.0)? - &y)?`. Scalars (`f64`,
//! `i32`) on either side are promoted to `(1, 1)` constants.

use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use crate::dcp::{add_curvature, mul_curvature, sub_curvature};
use crate::error::{CvxError, Result};
use crate::expr::{constant, BinaryNode, Expr, IndexNode, MulNode, NegNode, Side};

pub(crate) fn build_add(lhs: Arc<Expr>, rhs: Arc<Expr>) -> Result<Expr> {
    let shape = lhs.shape().elementwise(&rhs.shape())?;
    let curvature = add_curvature(lhs.curvature(), rhs.curvature());
    Ok(Expr::Add(BinaryNode {
        lhs,
        rhs,
        shape,
        curvature,
    }))
}

pub(crate) fn build_sub(lhs: Arc<Expr>, rhs: Arc<Expr>) -> Result<Expr> {
    let shape = lhs.shape().elementwise(&rhs.shape())?;
    let curvature = sub_curvature(lhs.curvature(), rhs.curvature());
    Ok(Expr::Sub(BinaryNode {
        lhs,
        rhs,
        shape,
        curvature,
    }))
}

pub(crate) fn build_neg(arg: Arc<Expr>) -> Expr {
    let curvature = arg.curvature().negate();
    Expr::Neg(NegNode { arg, curvature })
}

/// The constant check runs before the shape check: a product of two
/// non-constants is rejected even when its shapes would also disagree.
pub(crate) fn build_mul(lhs: Arc<Expr>, rhs: Arc<Expr>) -> Result<Expr> {
    let (lc, rc) = (lhs.curvature(), rhs.curvature());
    let curvature = mul_curvature(lc, rc).ok_or(CvxError::NonConstantMultiplier)?;
    let shape = lhs.shape().multiply(&rhs.shape())?;
    let coeff = if lc.is_constant() {
        Side::Left
    } else {
        Side::Right
    };
    Ok(Expr::Mul(MulNode {
        lhs,
        rhs,
        coeff,
        shape,
        curvature,
    }))
}

fn check_index(base: &Expr, row: usize, col: usize) -> Result<()> {
    if base.shape().contains(row, col) {
        Ok(())
    } else {
        Err(CvxError::InvalidIndex {
            row,
            col,
            name: base.name(),
        })
    }
}

pub(crate) fn build_index(base: Arc<Expr>, row: usize, col: usize) -> Result<Expr> {
    check_index(&base, row, col)?;
    Ok(Expr::Index(IndexNode { base, row, col }))
}

impl Expr {
    /// `self + rhs`.
    pub fn try_add(&self, rhs: impl Into<Expr>) -> Result<Expr> {
        build_add(Arc::new(self.clone()), Arc::new(rhs.into()))
    }

    /// `self - rhs`.
    pub fn try_sub(&self, rhs: impl Into<Expr>) -> Result<Expr> {
        build_sub(Arc::new(self.clone()), Arc::new(rhs.into()))
    }

    /// `self * rhs`; one of the factors must be constant.
    pub fn try_mul(&self, rhs: impl Into<Expr>) -> Result<Expr> {
        build_mul(Arc::new(self.clone()), Arc::new(rhs.into()))
    }

    /// The scalar element `self[row, col]` (zero-based).
    pub fn index(&self, row: usize, col: usize) -> Result<Expr> {
        build_index(Arc::new(self.clone()), row, col)
    }
}

/// Index into an expression.
pub fn index(expr: &Expr, row: usize, col: usize) -> Result<Expr> {
    expr.index(row, col)
}

// ============================================================================
// Operator overloading for Expr
// ============================================================================

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        build_neg(Arc::new(self))
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        build_neg(Arc::new(self.clone()))
    }
}

macro_rules! impl_binary_op {
    ($Op:ident, $method:ident, $build:ident) => {
        impl<R: Into<Expr>> $Op<R> for Expr {
            type Output = Result<Expr>;

            fn $method(self, rhs: R) -> Result<Expr> {
                $build(Arc::new(self), Arc::new(rhs.into()))
            }
        }

        impl<R: Into<Expr>> $Op<R> for &Expr {
            type Output = Result<Expr>;

            fn $method(self, rhs: R) -> Result<Expr> {
                $build(Arc::new(self.clone()), Arc::new(rhs.into()))
            }
        }

        impl $Op<Expr> for f64 {
            type Output = Result<Expr>;

            fn $method(self, rhs: Expr) -> Result<Expr> {
                $build(Arc::new(constant(self)), Arc::new(rhs))
            }
        }

        impl $Op<&Expr> for f64 {
            type Output = Result<Expr>;

            fn $method(self, rhs: &Expr) -> Result<Expr> {
                $build(Arc::new(constant(self)), Arc::new(rhs.clone()))
            }
        }

        impl $Op<Expr> for i32 {
            type Output = Result<Expr>;

            fn $method(self, rhs: Expr) -> Result<Expr> {
                $build(Arc::new(constant(f64::from(self))), Arc::new(rhs))
            }
        }

        impl $Op<&Expr> for i32 {
            type Output = Result<Expr>;

            fn $method(self, rhs: &Expr) -> Result<Expr> {
                $build(Arc::new(constant(f64::from(self))), Arc::new(rhs.clone()))
            }
        }
    };
}

impl_binary_op!(Add, add, build_add);
impl_binary_op!(Sub, sub, build_sub);
impl_binary_op!(Mul, mul, build_mul);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::Curvature;
    use crate::expr::{constant_columns, constant_vec, named_variable, parameter, variable, Shape};

    #[test]
    fn test_add() {
        let x = variable(5).unwrap();
        let y = variable(5).unwrap();
        let z = (&x + &y).unwrap();
        assert_eq!(z.shape(), Shape::vector(5));
        assert_eq!(z.curvature(), Curvature::Affine);
    }

    #[test]
    fn test_add_incompatible() {
        let x = variable(2).unwrap();
        let y = variable(3).unwrap();
        let err = (&x + &y).unwrap_err();
        assert_eq!(err.to_string(), "Incompatible dimensions.");
        assert_eq!(
            err,
            CvxError::IncompatibleDimensions {
                lhs: Shape::vector(2),
                rhs: Shape::vector(3),
            }
        );
    }

    #[test]
    fn test_sub() {
        let x = named_variable("x", 2).unwrap();
        let c = constant_vec(vec![2.0, 2.0]).unwrap();
        let z = (&x - &c).unwrap();
        assert_eq!(z.shape(), Shape::vector(2));
        assert_eq!(z.name(), "x - [[2], [2]]");
        assert!((&x - variable(3).unwrap()).is_err());
    }

    #[test]
    fn test_neg() {
        let x = named_variable("x", 5).unwrap();
        let z = -&x;
        assert_eq!(z.shape(), Shape::vector(5));
        assert_eq!(z.name(), "-x");
        assert_eq!((-z).curvature(), Curvature::Affine);
    }

    #[test]
    fn test_scalar_mul() {
        let x = variable(5).unwrap();
        let z = (2.0 * &x).unwrap();
        assert_eq!(z.shape(), Shape::vector(5));

        let z = (&x * 2.0).unwrap();
        assert_eq!(z.shape(), Shape::vector(5));
        assert_eq!(z.curvature(), Curvature::Affine);
    }

    #[test]
    fn test_mul_reassociates_right_constant() {
        let x = named_variable("x", 2).unwrap();
        let z = (&x * 3.0).unwrap();
        let Expr::Mul(node) = &z else {
            panic!("Expected Mul");
        };
        assert_eq!(node.coeff_side(), Side::Right);
        let (coeff, arg) = node.operands();
        assert!(coeff.is_constant());
        assert_eq!(**arg, x);
        // The user's operand order is kept for display.
        assert_eq!(z.name(), "x * 3");
    }

    #[test]
    fn test_mul_non_constant() {
        let a = variable((2, 2)).unwrap();
        let c = variable((3, 2)).unwrap();
        let err = (&a * &c).unwrap_err();
        assert_eq!(err.to_string(), "Cannot multiply on the left by a non-constant.");
        // Shapes agree here, the operands still are not constant.
        assert_eq!(
            (&a * &a).unwrap_err(),
            CvxError::NonConstantMultiplier
        );
    }

    #[test]
    fn test_mul_constant_dimension_error() {
        let c = variable((3, 2)).unwrap();
        let k = constant_columns(vec![vec![2.0, 1.0], vec![2.0, 2.0]]).unwrap();
        let err = (&k * &c).unwrap_err();
        assert_eq!(err.to_string(), "Incompatible dimensions.");
    }

    #[test]
    fn test_mul_matrix_shape() {
        let t = constant_columns(vec![vec![1.0, 2.0, 3.0], vec![3.0, 5.0, 5.0]]).unwrap();
        let b = variable((2, 2)).unwrap();
        let e = ((&t + &t).unwrap() * &b).unwrap();
        assert_eq!(e.curvature(), Curvature::Affine);
        assert_eq!(e.shape(), (3, 2));
    }

    #[test]
    fn test_parameter_multiplies_like_constant() {
        let p = parameter("p", ()).unwrap();
        let x = variable(3).unwrap();
        let e = (&p * &x).unwrap();
        assert_eq!(e.curvature(), Curvature::Affine);
        assert_eq!(e.shape(), (3, 1));
    }

    #[test]
    fn test_index() {
        let x = named_variable("x", 2).unwrap();
        let e = index(&x, 1, 0).unwrap();
        assert_eq!(e.name(), "x[1,0]");
        assert_eq!(e.shape(), Shape::scalar());
        assert_eq!(e.curvature(), Curvature::Affine);

        let err = x.index(2, 0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid indices 2,0 for 'x'.");
    }

    #[test]
    fn test_shared_subexpression() {
        let x = named_variable("x", 2).unwrap();
        let s = Arc::new((&x + 1.0).unwrap());
        let e = build_add(Arc::clone(&s), Arc::clone(&s)).unwrap();
        assert_eq!(e.variables().len(), 1);
        assert_eq!(e.name(), "x + 1 + x + 1");
    }

    #[test]
    fn test_integer_scalars() {
        let x = variable(2).unwrap();
        assert_eq!((4 - &x).unwrap().shape(), (2, 1));
        assert_eq!((4 * &x).unwrap().shape(), (2, 1));
        assert_eq!((&x + 2).unwrap().name(), format!("{} + 2", x.name()));
    }
}
