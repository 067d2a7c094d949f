//! Constant expression creation and evaluation of constant trees.

use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;

use super::expression::{Array, ConstantData, Expr};
use crate::error::{CvxError, Result};

/// Wrap `value` as a constant, rejecting empty data.
fn from_array(value: Array, name: Option<String>) -> Result<Expr> {
    value.shape().checked()?;
    Ok(Expr::Constant(ConstantData { value, name }))
}

/// Create a constant expression from a scalar.
pub fn constant(value: f64) -> Expr {
    Expr::Constant(ConstantData {
        value: Array::Scalar(value),
        name: None,
    })
}

/// Create a constant column vector.
pub fn constant_vec(values: Vec<f64>) -> Result<Expr> {
    from_array(Array::from_vec(values), None)
}

/// Create a constant matrix from column-major data.
pub fn constant_matrix(values: Vec<f64>, rows: usize, cols: usize) -> Result<Expr> {
    if values.len() != rows * cols {
        return Err(CvxError::InvalidValue(format!(
            "{} values cannot fill a {}x{} matrix",
            values.len(),
            rows,
            cols
        )));
    }
    from_array(Array::Dense(DMatrix::from_vec(rows, cols, values)), None)
}

/// Create a constant matrix from a list of columns.
///
/// `[[2.0], [2.0]]` is the 1x2 row vector; `[[1.0, 2.0, 3.0], [3.0, 5.0, 5.0]]`
/// is a 3x2 matrix.
pub fn constant_columns(columns: Vec<Vec<f64>>) -> Result<Expr> {
    let rows = columns.first().map_or(0, Vec::len);
    if columns.iter().any(|c| c.len() != rows) {
        return Err(CvxError::InvalidValue(
            "columns must all have the same length".to_string(),
        ));
    }
    let cols = columns.len();
    constant_matrix(columns.into_iter().flatten().collect(), rows, cols)
}

/// Create a constant expression from a nalgebra DMatrix.
pub fn constant_dmatrix(matrix: DMatrix<f64>) -> Result<Expr> {
    from_array(Array::Dense(matrix), None)
}

/// Create a constant expression from a sparse CSC matrix.
pub fn constant_sparse(matrix: CscMatrix<f64>) -> Result<Expr> {
    from_array(Array::Sparse(matrix), None)
}

/// Create a named constant.
pub fn named_constant(name: impl Into<String>, value: impl Into<Array>) -> Result<Expr> {
    from_array(value.into(), Some(name.into()))
}

impl Expr {
    /// Numeric value of a constant expression.
    ///
    /// Returns `Ok(None)` when the expression depends on a variable, and an
    /// error when it depends on a parameter, which has no value yet.
    pub fn value(&self) -> Result<Option<DMatrix<f64>>> {
        if !self.curvature().is_constant() {
            return Ok(None);
        }
        self.evaluate().map(Some)
    }

    fn evaluate(&self) -> Result<DMatrix<f64>> {
        match self {
            Expr::Constant(c) => Ok(c.value.to_dense()),
            Expr::Parameter(p) => Err(CvxError::UnboundParameter(p.name.clone())),
            Expr::Add(node) => Ok(zip_broadcast(
                &node.lhs.evaluate()?,
                &node.rhs.evaluate()?,
                |a, b| a + b,
            )),
            Expr::Sub(node) => Ok(zip_broadcast(
                &node.lhs.evaluate()?,
                &node.rhs.evaluate()?,
                |a, b| a - b,
            )),
            Expr::Neg(node) => Ok(-node.arg.evaluate()?),
            Expr::Mul(node) => Ok(product(&node.lhs.evaluate()?, &node.rhs.evaluate()?)),
            Expr::Index(node) => {
                let base = node.base.evaluate()?;
                Ok(DMatrix::from_element(1, 1, base[(node.row, node.col)]))
            }
            // Constant curvature rules out variables below this point.
            Expr::Variable(v) => Err(CvxError::InvalidValue(format!(
                "variable '{}' has no value",
                v.name()
            ))),
        }
    }
}

fn is_scalar(m: &DMatrix<f64>) -> bool {
    m.nrows() == 1 && m.ncols() == 1
}

/// Elementwise combination with scalar broadcasting. Shapes were validated
/// when the node was built.
fn zip_broadcast(a: &DMatrix<f64>, b: &DMatrix<f64>, f: impl Fn(f64, f64) -> f64) -> DMatrix<f64> {
    if is_scalar(b) {
        let s = b[(0, 0)];
        a.map(|v| f(v, s))
    } else if is_scalar(a) {
        let s = a[(0, 0)];
        b.map(|v| f(s, v))
    } else {
        a.zip_map(b, f)
    }
}

fn product(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    if is_scalar(a) {
        b * a[(0, 0)]
    } else if is_scalar(b) {
        a * b[(0, 0)]
    } else {
        a * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::Curvature;
    use crate::expr::{parameter, variable, Shape};

    #[test]
    fn test_constant_scalar() {
        let c = constant(5.0);
        if let Expr::Constant(data) = &c {
            assert_eq!(data.value.as_scalar(), Some(5.0));
        } else {
            panic!("Expected Constant");
        }
        assert_eq!(c.name(), "5");
        assert_eq!(c.curvature(), Curvature::Constant);
    }

    #[test]
    fn test_constant_vec_is_column() {
        let c = constant_vec(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(c.shape(), Shape::matrix(3, 1));
    }

    #[test]
    fn test_empty_constants_rejected() {
        assert!(matches!(constant_vec(vec![]), Err(CvxError::InvalidValue(_))));
        assert!(constant_columns(vec![]).is_err());
        assert!(constant_columns(vec![vec![], vec![]]).is_err());
        assert!(constant_matrix(vec![], 0, 3).is_err());
        assert!(constant_dmatrix(DMatrix::zeros(0, 2)).is_err());
        assert!(named_constant("e", Vec::<f64>::new()).is_err());
    }

    #[test]
    fn test_constant_columns() {
        let row = constant_columns(vec![vec![2.0], vec![2.0]]).unwrap();
        assert_eq!(row.shape(), (1, 2));

        let t = constant_columns(vec![vec![1.0, 2.0, 3.0], vec![3.0, 5.0, 5.0]]).unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.constant_value().unwrap().get(2, 1), Some(5.0));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = constant_columns(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, CvxError::InvalidValue(_)));
        assert!(constant_matrix(vec![1.0, 2.0, 3.0], 2, 2).is_err());
    }

    #[test]
    fn test_named_constant() {
        let c = named_constant("c", 2.0).unwrap();
        assert_eq!(c.name(), "c");
        assert_eq!(c.constant_value().unwrap().as_scalar(), Some(2.0));
        assert_eq!(constant(2.0).named("two").name(), "two");
    }

    #[test]
    fn test_value_of_constant_tree() {
        let t = constant_columns(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let e = ((&t + &t).unwrap() - 1.0).unwrap();
        let v = e.value().unwrap().unwrap();
        assert_eq!(v, DMatrix::from_row_slice(2, 2, &[1.0, 5.0, 3.0, 7.0]));

        let scaled = (2.0 * &t).unwrap().index(1, 0).unwrap();
        assert_eq!(scaled.value().unwrap().unwrap()[(0, 0)], 4.0);
    }

    #[test]
    fn test_value_of_variable_tree_is_none() {
        let x = variable(2).unwrap();
        let e = (&x + 1.0).unwrap();
        assert_eq!(e.value().unwrap(), None);
    }

    #[test]
    fn test_value_of_parameter_fails() {
        let p = parameter("p", ()).unwrap();
        let err = (&p + 1.0).unwrap().value().unwrap_err();
        assert_eq!(err.to_string(), "Parameter 'p' has no value.");
    }
}
