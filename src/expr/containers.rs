//! Bundles of named variables.

use std::collections::BTreeMap;
use std::ops::Index;

use super::expression::Expr;
use super::shape::Shape;
use super::variable::named_variable;
use crate::error::Result;

/// A set of named variables created together.
///
/// ```
/// use cvxexpr::expr::Variables;
///
/// # fn main() -> cvxexpr::Result<()> {
/// let v = Variables::new([("y", 3.into()), ("x", ().into()), ("A", (3, 4).into())])?;
/// assert_eq!(v["y"].shape(), (3, 1));
/// assert_eq!(v["A"].name(), "A");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Variables {
    vars: BTreeMap<String, Expr>,
}

impl Variables {
    /// Create one variable per `(name, shape)` entry. A repeated name
    /// replaces the earlier variable.
    pub fn new<N: Into<String>>(specs: impl IntoIterator<Item = (N, Shape)>) -> Result<Self> {
        let vars = specs
            .into_iter()
            .map(|(name, shape)| {
                let name = name.into();
                let var = named_variable(name.clone(), shape)?;
                Ok((name, var))
            })
            .collect::<Result<_>>()?;
        Ok(Variables { vars })
    }

    /// Create scalar variables with the given names.
    pub fn scalars<N: Into<String>>(names: impl IntoIterator<Item = N>) -> Result<Self> {
        Self::new(names.into_iter().map(|n| (n, Shape::scalar())))
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(name, variable)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.vars.iter().map(|(name, var)| (name.as_str(), var))
    }
}

impl Index<&str> for Variables {
    type Output = Expr;

    /// Panics if no variable has this name; use [`Variables::get`] to check.
    fn index(&self, name: &str) -> &Expr {
        &self.vars[name]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables() {
        let v = Variables::new([
            ("y", Shape::vector(3)),
            ("x", Shape::scalar()),
            ("z", Shape::scalar()),
            ("A", Shape::matrix(3, 4)),
        ])
        .unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v["y"].name(), "y");
        assert_eq!(v["y"].shape(), (3, 1));
        assert_eq!(v["x"].shape(), (1, 1));
        assert_eq!(v["z"].name(), "z");
        assert_eq!(v["A"].shape(), (3, 4));
        assert!(v.get("w").is_none());
    }

    #[test]
    fn test_scalars_are_distinct() {
        let v = Variables::scalars(["a", "b"]).unwrap();
        assert_ne!(v["a"].variable_id(), v["b"].variable_id());
        let names: Vec<_> = v.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_empty_shape_rejected() {
        let v = Variables::new([("x", Shape::scalar()), ("y", Shape::vector(0))]);
        assert!(v.is_err());
    }
}
