//! Constraints built from expression comparisons.

pub mod constraint;

pub use constraint::{Constraint, ConstraintExt, Relation};
