//! Parameters: named placeholders whose values arrive after modeling.

use super::expression::{Expr, ExprId, ParameterData};
use super::shape::Shape;
use crate::error::Result;

/// Create a parameter with the given name and shape.
///
/// Parameters combine like constants but are not variables, so they never
/// show up in [`Expr::variables`].
pub fn parameter(name: impl Into<String>, shape: impl Into<Shape>) -> Result<Expr> {
    Ok(Expr::Parameter(ParameterData {
        id: ExprId::new(),
        name: name.into(),
        shape: shape.into().checked()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::Curvature;

    #[test]
    fn test_parameter() {
        let p = parameter("p", ()).unwrap();
        assert_eq!(p.name(), "p");
        assert_eq!(p.shape(), (1, 1));
        assert_eq!(p.curvature(), Curvature::Constant);
        assert!(p.variables().is_empty());
    }

    #[test]
    fn test_parameter_identity() {
        let p = parameter("p", 3).unwrap();
        let q = parameter("p", 3).unwrap();
        assert_eq!(p, p.clone());
        assert_ne!(p, q);
    }

    #[test]
    fn test_empty_parameter_rejected() {
        assert!(parameter("p", (0, 2)).is_err());
    }
}
