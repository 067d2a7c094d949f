//! Curvature tracking for DCP (Disciplined Convex Programming).
//!
//! Curvatures form the lattice
//! `Constant < Affine < {Convex, Concave} < Unknown`, with `Convex` and
//! `Concave` incomparable.

use std::fmt;

use crate::expr::Expr;

/// Curvature of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curvature {
    /// Constant value (most restrictive).
    Constant,
    /// Affine function (both convex and concave).
    Affine,
    /// Convex function.
    Convex,
    /// Concave function.
    Concave,
    /// Unknown curvature (not DCP-compliant).
    Unknown,
}

impl Curvature {
    /// Check if the curvature is convex (constant, affine, or convex).
    pub fn is_convex(self) -> bool {
        matches!(self, Curvature::Constant | Curvature::Affine | Curvature::Convex)
    }

    /// Check if the curvature is concave (constant, affine, or concave).
    pub fn is_concave(self) -> bool {
        matches!(self, Curvature::Constant | Curvature::Affine | Curvature::Concave)
    }

    /// Check if the curvature is affine (constant or affine).
    pub fn is_affine(self) -> bool {
        matches!(self, Curvature::Constant | Curvature::Affine)
    }

    /// Check if this is a constant.
    pub fn is_constant(self) -> bool {
        matches!(self, Curvature::Constant)
    }

    /// Negate the curvature (convex <-> concave).
    pub fn negate(self) -> Self {
        match self {
            Curvature::Convex => Curvature::Concave,
            Curvature::Concave => Curvature::Convex,
            other => other,
        }
    }

    /// Least upper bound in the curvature lattice.
    pub fn join(self, other: Curvature) -> Curvature {
        add_curvature(self, other)
    }
}

impl fmt::Display for Curvature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Curvature::Constant => "CONSTANT",
            Curvature::Affine => "AFFINE",
            Curvature::Convex => "CONVEX",
            Curvature::Concave => "CONCAVE",
            Curvature::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Combine curvatures for addition: a + b.
pub fn add_curvature(a: Curvature, b: Curvature) -> Curvature {
    use Curvature::*;
    match (a, b) {
        // Constants don't affect curvature
        (Constant, x) | (x, Constant) => x,
        (Affine, x) | (x, Affine) => x,
        (Convex, Convex) => Convex,
        (Concave, Concave) => Concave,
        (Convex, Concave) | (Concave, Convex) => Unknown,
        (Unknown, _) | (_, Unknown) => Unknown,
    }
}

/// Combine curvatures for subtraction: the same join as addition.
pub fn sub_curvature(a: Curvature, b: Curvature) -> Curvature {
    add_curvature(a, b)
}

/// Combine curvatures for multiplication.
///
/// One factor must be constant; the product then takes the curvature of the
/// other factor. Returns `None` when neither factor is constant.
pub fn mul_curvature(a: Curvature, b: Curvature) -> Option<Curvature> {
    if a.is_constant() {
        Some(b)
    } else if b.is_constant() {
        Some(a)
    } else {
        None
    }
}

impl Expr {
    /// Get the curvature of this expression.
    pub fn curvature(&self) -> Curvature {
        match self {
            // Leaves
            Expr::Variable(_) => Curvature::Affine,
            Expr::Constant(_) | Expr::Parameter(_) => Curvature::Constant,

            // Cached by the builders
            Expr::Add(node) | Expr::Sub(node) => node.curvature,
            Expr::Neg(node) => node.curvature,
            Expr::Mul(node) => node.curvature,
            Expr::Index(node) => node.base.curvature(),
        }
    }

    /// Check if this expression is convex.
    pub fn is_convex(&self) -> bool {
        self.curvature().is_convex()
    }

    /// Check if this expression is concave.
    pub fn is_concave(&self) -> bool {
        self.curvature().is_concave()
    }

    /// Check if this expression is affine.
    pub fn is_affine(&self) -> bool {
        self.curvature().is_affine()
    }

    /// Check if this expression has constant curvature.
    pub fn is_constant(&self) -> bool {
        self.curvature().is_constant()
    }
}
