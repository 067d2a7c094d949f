//! Coefficient form of affine expressions.
//!
//! A solver-facing consumer needs an affine expression as numbers:
//! `vec(expr) = sum_i(A_i * vec(x_i)) + vec(b)`, with `vec` stacking columns.
//! Each `A_i` is a sparse matrix of shape `(expr.size, x_i.size)`.

use std::collections::HashMap;

use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;

use crate::error::{CvxError, Result};
use crate::expr::{Expr, ExprId, MulNode, Shape, Side};
use crate::sparse::{
    csc_add, csc_neg, csc_repeat_rows, csc_scale, csc_select_row, csc_to_dense, dense_to_csc,
};

/// A linear expression in standard form: sum_i(A_i * x_i) + b
#[derive(Debug, Clone)]
pub struct LinExpr {
    /// Coefficient matrices for each variable: var_id -> coefficient matrix.
    pub coeffs: HashMap<ExprId, CscMatrix<f64>>,
    /// Constant term (offset), in the expression's shape.
    pub constant: DMatrix<f64>,
    /// Output shape of this expression.
    pub shape: Shape,
}

impl LinExpr {
    /// Create a zero linear expression with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        LinExpr {
            coeffs: HashMap::new(),
            constant: DMatrix::zeros(shape.rows(), shape.cols()),
            shape,
        }
    }

    /// Create a linear expression for a single variable (identity coefficient).
    pub fn variable(var_id: ExprId, shape: Shape) -> Self {
        let mut lin = LinExpr::zeros(shape);
        lin.coeffs.insert(var_id, CscMatrix::identity(shape.size()));
        lin
    }

    /// Create a constant linear expression.
    pub fn constant(value: DMatrix<f64>) -> Self {
        let shape = Shape::matrix(value.nrows(), value.ncols());
        LinExpr {
            coeffs: HashMap::new(),
            constant: value,
            shape,
        }
    }

    /// Check if this is a constant (no variables).
    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Get the output size (flattened).
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    /// Coefficient matrix of a variable, if it appears.
    pub fn coeff(&self, var_id: ExprId) -> Option<&CscMatrix<f64>> {
        self.coeffs.get(&var_id)
    }

    /// Repeat a scalar expression over `shape`.
    fn broadcast_to(&self, shape: Shape) -> LinExpr {
        if self.shape == shape || !self.shape.is_scalar() {
            return self.clone();
        }
        LinExpr {
            coeffs: self
                .coeffs
                .iter()
                .map(|(k, v)| (*k, csc_repeat_rows(v, shape.size())))
                .collect(),
            constant: DMatrix::from_element(shape.rows(), shape.cols(), self.constant[(0, 0)]),
            shape,
        }
    }

    /// Add two linear expressions, broadcasting a scalar side.
    pub fn add(&self, other: &LinExpr) -> LinExpr {
        let shape = self.shape.broadcast(&other.shape).unwrap_or(self.shape);
        let lhs = self.broadcast_to(shape);
        let rhs = other.broadcast_to(shape);

        let mut coeffs = lhs.coeffs;
        for (var_id, coeff) in rhs.coeffs {
            match coeffs.get_mut(&var_id) {
                Some(existing) => *existing = csc_add(existing, &coeff),
                None => {
                    coeffs.insert(var_id, coeff);
                }
            }
        }

        LinExpr {
            coeffs,
            constant: lhs.constant + rhs.constant,
            shape,
        }
    }

    /// Negate a linear expression.
    pub fn neg(&self) -> LinExpr {
        LinExpr {
            coeffs: self.coeffs.iter().map(|(k, v)| (*k, csc_neg(v))).collect(),
            constant: -&self.constant,
            shape: self.shape,
        }
    }

    /// Scale by a scalar.
    pub fn scale(&self, scalar: f64) -> LinExpr {
        LinExpr {
            coeffs: self
                .coeffs
                .iter()
                .map(|(k, v)| (*k, csc_scale(v, scalar)))
                .collect(),
            constant: &self.constant * scalar,
            shape: self.shape,
        }
    }

    /// `a * self` for a constant matrix `a`.
    ///
    /// Uses `vec(A E) = (I_n ⊗ A) vec(E)`.
    pub fn left_mul(&self, a: &DMatrix<f64>) -> LinExpr {
        if self.shape.is_scalar() {
            return self.outer(a);
        }
        let lift = DMatrix::<f64>::identity(self.shape.cols(), self.shape.cols()).kronecker(a);
        self.transform(&lift, a * &self.constant)
    }

    /// `self * b` for a constant matrix `b`.
    ///
    /// Uses `vec(E B) = (B' ⊗ I_m) vec(E)`.
    pub fn right_mul(&self, b: &DMatrix<f64>) -> LinExpr {
        if self.shape.is_scalar() {
            return self.outer(b);
        }
        let lift = b
            .transpose()
            .kronecker(&DMatrix::<f64>::identity(self.shape.rows(), self.shape.rows()));
        self.transform(&lift, &self.constant * b)
    }

    /// Scalar expression times a constant matrix `m`: every coefficient row
    /// is spread over `vec(m)`.
    fn outer(&self, m: &DMatrix<f64>) -> LinExpr {
        let column = DMatrix::from_column_slice(m.len(), 1, m.as_slice());
        LinExpr {
            coeffs: self
                .coeffs
                .iter()
                .map(|(k, v)| (*k, dense_to_csc(&(&column * csc_to_dense(v)))))
                .collect(),
            constant: m * self.constant[(0, 0)],
            shape: Shape::matrix(m.nrows(), m.ncols()),
        }
    }

    fn transform(&self, lift: &DMatrix<f64>, constant: DMatrix<f64>) -> LinExpr {
        LinExpr {
            coeffs: self
                .coeffs
                .iter()
                .map(|(k, v)| (*k, dense_to_csc(&(lift * csc_to_dense(v)))))
                .collect(),
            shape: Shape::matrix(constant.nrows(), constant.ncols()),
            constant,
        }
    }

    /// The scalar element `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> LinExpr {
        let offset = self.shape.offset(row, col);
        LinExpr {
            coeffs: self
                .coeffs
                .iter()
                .map(|(k, v)| (*k, csc_select_row(v, offset)))
                .collect(),
            constant: DMatrix::from_element(1, 1, self.constant[(row, col)]),
            shape: Shape::scalar(),
        }
    }

    /// Get all variable IDs in this expression.
    pub fn variables(&self) -> Vec<ExprId> {
        let mut vars: Vec<_> = self.coeffs.keys().copied().collect();
        vars.sort();
        vars
    }
}

/// Lower an affine expression to coefficient form.
pub fn lower(expr: &Expr) -> Result<LinExpr> {
    match expr {
        Expr::Variable(v) => Ok(LinExpr::variable(v.id, v.shape)),
        Expr::Constant(c) => Ok(LinExpr::constant(c.value.to_dense())),
        Expr::Parameter(p) => Err(CvxError::UnboundParameter(p.name.clone())),
        Expr::Add(node) => Ok(lower(&node.lhs)?.add(&lower(&node.rhs)?)),
        Expr::Sub(node) => Ok(lower(&node.lhs)?.add(&lower(&node.rhs)?.neg())),
        Expr::Neg(node) => Ok(lower(&node.arg)?.neg()),
        Expr::Mul(node) => lower_mul(node),
        Expr::Index(node) => Ok(lower(&node.base)?.index(node.row, node.col)),
    }
}

fn lower_mul(node: &MulNode) -> Result<LinExpr> {
    let (coeff, arg) = node.operands();
    // The coefficient has constant curvature, so only a parameter can leave
    // it without a value.
    let value = coeff
        .value()?
        .ok_or_else(|| CvxError::InvalidValue(format!("'{}' is not constant", coeff.name())))?;
    let arg = lower(arg)?;
    if value.nrows() == 1 && value.ncols() == 1 {
        return Ok(arg.scale(value[(0, 0)]));
    }
    Ok(match node.coeff_side() {
        Side::Left => arg.left_mul(&value),
        Side::Right => arg.right_mul(&value),
    })
}

impl Expr {
    /// Coefficient form of this expression, for solver-facing consumers.
    ///
    /// Fails with [`CvxError::UnboundParameter`] if a parameter is reached.
    #[tracing::instrument(level = "debug", skip_all, fields(shape = %self.shape()))]
    pub fn coefficients(&self) -> Result<LinExpr> {
        let canon = self.canonicalize()?;
        lower(&canon.expr)
    }
}
