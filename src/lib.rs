//! # cvxexpr
//!
//! The expression layer of a Disciplined Convex Programming (DCP) modeling
//! library.
//!
//! cvxexpr builds expression trees from variables, constants and parameters,
//! infers each node's shape and curvature as it is built, rejects illegal
//! combinations immediately, and canonicalizes trees into an affine
//! expression plus auxiliary constraints for a downstream solver.
//!
//! ## Quick Start
//!
//! ```
//! use cvxexpr::prelude::*;
//!
//! # fn main() -> cvxexpr::Result<()> {
//! let x = named_variable("x", 2)?;
//! let a = constant_columns(vec![vec![1.0, 3.0], vec![2.0, 4.0]])?;
//!
//! let e = ((&a * &x)? + 1.0)?;
//! assert_eq!(e.shape(), (2, 1));
//! assert_eq!(e.curvature(), Curvature::Affine);
//!
//! let canon = e.canonicalize()?;
//! assert_eq!(canon.expr, e);
//! assert!(canon.constraints.is_empty());
//!
//! let c = x.geq(4.0)?;
//! assert_eq!(c.shape(), (2, 1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Rules
//!
//! - Elementwise operators need equal shapes, or a scalar on one side.
//! - Products need matching inner dimensions, or a scalar factor, and at
//!   least one constant factor.
//! - Indices are zero-based `(row, col)` pairs within the shape.
//!
//! ## Architecture
//!
//! - **Expression trees** built using the `Expr` enum with `Arc` sharing
//! - **Curvature** cached per node, combined through the lattice in `dcp`
//! - **Canonicalization** reduces trees to affine form plus constraints
//! - **Lowering** turns affine trees into sparse coefficient matrices

pub mod atoms;
pub mod canon;
pub mod constraints;
pub mod dcp;
pub mod error;
pub mod expr;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use cvxexpr::prelude::*;
/// ```
pub mod prelude {
    // Expression types
    pub use crate::expr::{
        constant, constant_columns, constant_dmatrix, constant_matrix, constant_sparse,
        constant_vec, named_constant, named_variable, parameter, variable, Array, Expr, ExprId,
        Shape, VariableBuilder, Variables,
    };

    // Atoms
    pub use crate::atoms::index;

    // Constraints
    pub use crate::constraints::{Constraint, ConstraintExt, Relation};

    // DCP
    pub use crate::dcp::Curvature;

    // Canonicalization
    pub use crate::canon::{canonicalize, CanonResult, LinExpr};

    // Errors
    pub use crate::error::{CvxError, Result};
}

// Re-export main types at crate root
pub use canon::CanonResult;
pub use constraints::Constraint;
pub use error::{CvxError, Result};
pub use expr::Expr;
