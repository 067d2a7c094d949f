//! Canonicalization transforms expressions into standard form.
//!
//! This module converts expressions into:
//! - An affine expression plus auxiliary constraints (`CanonResult`)
//! - Numeric coefficient form (`LinExpr`) for solver-facing consumers

pub mod canonicalizer;
pub mod lin_expr;

pub use canonicalizer::{canonicalize, CanonResult};
pub use lin_expr::{lower, LinExpr};
