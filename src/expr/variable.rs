//! Variable creation with builder pattern.

use super::expression::{Expr, ExprId, VariableData};
use super::shape::Shape;
use crate::error::Result;

/// Builder for creating variables.
#[derive(Debug, Clone, Default)]
pub struct VariableBuilder {
    shape: Shape,
    name: Option<String>,
}

impl VariableBuilder {
    /// Start a variable of the given shape.
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            ..Default::default()
        }
    }

    /// Display name; a name derived from the id is used otherwise.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the variable. Each call draws a fresh id.
    ///
    /// Fails if the shape has an empty dimension.
    pub fn build(self) -> Result<Expr> {
        Ok(Expr::Variable(VariableData {
            id: ExprId::new(),
            shape: self.shape.checked()?,
            name: self.name,
        }))
    }
}

/// Create a variable with the given shape.
///
/// # Examples
///
/// ```
/// use cvxexpr::expr::variable;
///
/// # fn main() -> cvxexpr::Result<()> {
/// // Scalar variable
/// let x = variable(())?;
///
/// // Column vector
/// let y = variable(5)?;
/// assert_eq!(y.shape(), (5, 1));
///
/// // Matrix variable
/// let z = variable((3, 4))?;
///
/// // Shapes must be non-empty
/// assert!(variable(0).is_err());
/// # Ok(())
/// # }
/// ```
pub fn variable(shape: impl Into<Shape>) -> Result<Expr> {
    VariableBuilder::new(shape).build()
}

/// Create a named variable with the given shape.
pub fn named_variable(name: impl Into<String>, shape: impl Into<Shape>) -> Result<Expr> {
    VariableBuilder::new(shape).name(name).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::Curvature;
    use crate::error::CvxError;

    #[test]
    fn test_variable_builder() {
        let x = VariableBuilder::new(5).name("x").build().unwrap();

        if let Expr::Variable(v) = &x {
            assert_eq!(v.shape, Shape::vector(5));
            assert_eq!(v.name, Some("x".to_string()));
        } else {
            panic!("Expected Variable");
        }
        assert_eq!(x.name(), "x");
    }

    #[test]
    fn test_variable_function() {
        let x = variable((3, 4)).unwrap();
        assert_eq!(x.shape(), Shape::matrix(3, 4));
        assert_eq!(x.curvature(), Curvature::Affine);
    }

    #[test]
    fn test_empty_shape_rejected() {
        assert!(matches!(variable(0), Err(CvxError::InvalidValue(_))));
        assert!(matches!(variable((2, 0)), Err(CvxError::InvalidValue(_))));
        assert!(named_variable("x", (0, 3)).is_err());
    }

    #[test]
    fn test_unnamed_variables_get_distinct_names() {
        let x = variable(2).unwrap();
        let y = variable(2).unwrap();
        assert_ne!(x.name(), y.name());
        assert_ne!(x, y);
    }

    #[test]
    fn test_same_name_is_not_same_variable() {
        let a = named_variable("x", 2).unwrap();
        let b = named_variable("x", 2).unwrap();
        assert_eq!(a.name(), b.name());
        assert_ne!(a.variable_id(), b.variable_id());
    }
}
