//! Atom functions for building expressions.
//!
//! The affine atoms (add, sub, neg, mul, index) and the operator overloads
//! that construct them.

pub mod affine;

pub use affine::index;
