//! Constraints produced by comparing expressions.
//!
//! A constraint is built from two expressions and a relation. Both sides are
//! canonicalized on construction, so a `Constraint` always holds affine sides
//! and can be handed to a solver-facing consumer as is.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::atoms::affine::build_sub;
use crate::canon::canonicalize;
use crate::error::Result;
use crate::expr::{Expr, ExprId, Shape};

/// Relation between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "==",
        };
        f.write_str(s)
    }
}

/// A relational statement between two canonicalized expressions.
///
/// Each side keeps its own shape. A scalar side is not expanded: in
/// `4 <= x` with `x` of shape `(2, 1)` the left side stays `(1, 1)` and
/// broadcasts against the right. The broadcast shape `(2, 1)` is what
/// [`Constraint::shape`] and [`Constraint::residual`] report.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    lhs: Expr,
    rhs: Expr,
    relation: Relation,
    shape: Shape,
    /// Constraints introduced while canonicalizing the sides, lhs first.
    auxiliary: Vec<Constraint>,
}

impl Constraint {
    /// Build `lhs <relation> rhs`.
    ///
    /// Fails if the sides cannot be broadcast against each other or if
    /// canonicalizing either side fails.
    pub fn new(lhs: impl Into<Expr>, relation: Relation, rhs: impl Into<Expr>) -> Result<Self> {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        let shape = lhs.shape().elementwise(&rhs.shape())?;
        let lhs = canonicalize(&lhs)?;
        let rhs = canonicalize(&rhs)?;
        let mut auxiliary = lhs.constraints;
        auxiliary.extend(rhs.constraints);
        Ok(Constraint {
            lhs: lhs.expr,
            rhs: rhs.expr,
            relation,
            shape,
            auxiliary,
        })
    }

    /// Create an equality constraint: lhs == rhs.
    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Result<Self> {
        Self::new(lhs, Relation::Eq, rhs)
    }

    /// Create an inequality constraint: lhs <= rhs.
    pub fn leq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Result<Self> {
        Self::new(lhs, Relation::Le, rhs)
    }

    /// Create an inequality constraint: lhs >= rhs.
    pub fn geq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Result<Self> {
        Self::new(lhs, Relation::Ge, rhs)
    }

    pub fn lhs(&self) -> &Expr {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// Broadcast shape of the two sides.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn auxiliary(&self) -> &[Constraint] {
        &self.auxiliary
    }

    /// The constraint as `lhs - rhs <relation> 0`.
    pub fn residual(&self) -> Result<Expr> {
        build_sub(Arc::new(self.lhs.clone()), Arc::new(self.rhs.clone()))
    }

    /// Check if this constraint is DCP-compliant.
    ///
    /// - Eq: both sides affine
    /// - Le: convex <= concave
    /// - Ge: concave >= convex
    pub fn is_dcp(&self) -> bool {
        match self.relation {
            Relation::Eq => self.lhs.is_affine() && self.rhs.is_affine(),
            Relation::Le => self.lhs.is_convex() && self.rhs.is_concave(),
            Relation::Ge => self.lhs.is_concave() && self.rhs.is_convex(),
        }
    }

    /// Distinct variables on either side.
    pub fn variables(&self) -> BTreeMap<ExprId, Expr> {
        let mut vars = self.lhs.variables();
        vars.extend(self.rhs.variables());
        vars
    }

    pub fn name(&self) -> String {
        format!("{} {} {}", self.lhs.name(), self.relation, self.rhs.name())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Extension trait for creating constraints from expressions.
pub trait ConstraintExt {
    /// Create equality constraint: self == rhs.
    fn equals(&self, rhs: impl Into<Expr>) -> Result<Constraint>;

    /// Create inequality constraint: self <= rhs.
    fn leq(&self, rhs: impl Into<Expr>) -> Result<Constraint>;

    /// Create inequality constraint: self >= rhs.
    fn geq(&self, rhs: impl Into<Expr>) -> Result<Constraint>;
}

impl ConstraintExt for Expr {
    fn equals(&self, rhs: impl Into<Expr>) -> Result<Constraint> {
        Constraint::eq(self, rhs)
    }

    fn leq(&self, rhs: impl Into<Expr>) -> Result<Constraint> {
        Constraint::leq(self, rhs)
    }

    fn geq(&self, rhs: impl Into<Expr>) -> Result<Constraint> {
        Constraint::geq(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{constant, named_variable, variable};

    #[test]
    fn test_equality_constraint() {
        let x = variable(5).unwrap();
        let constr = Constraint::eq(&x, constant(1.0)).unwrap();

        assert!(constr.is_dcp());
        assert_eq!(constr.relation(), Relation::Eq);
        assert_eq!(constr.shape(), Shape::vector(5));
        assert!(constr.auxiliary().is_empty());
    }

    #[test]
    fn test_scalar_on_the_left() {
        let x = named_variable("x", 2).unwrap();
        let le = Constraint::leq(4.0, &x).unwrap();
        assert_eq!(le.shape(), (2, 1));
        assert_eq!(le.lhs().shape(), (1, 1));
        assert_eq!(le.name(), "4 <= x");
        assert_eq!(le.residual().unwrap().shape(), (2, 1));

        let ge = x.geq(4).unwrap();
        assert_eq!(ge.shape(), (2, 1));
        assert_eq!(ge.rhs().name(), "4");
    }

    #[test]
    fn test_incompatible_sides() {
        let x = variable(2).unwrap();
        let y = variable(3).unwrap();
        let err = x.leq(&y).unwrap_err();
        assert_eq!(err.to_string(), "Incompatible dimensions.");
    }

    #[test]
    fn test_residual() {
        let x = named_variable("x", 3).unwrap();
        let constr = x.leq(constant(1.0)).unwrap();
        let r = constr.residual().unwrap();
        assert_eq!(r.name(), "x - 1");
        assert_eq!(r.shape(), (3, 1));
    }

    #[test]
    fn test_constraint_variables() {
        let x = variable(2).unwrap();
        let y = variable(2).unwrap();
        let constr = (&x + &y).unwrap().equals(&x).unwrap();
        assert_eq!(constr.variables().len(), 2);
    }
}
