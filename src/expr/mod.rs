//! Expression types and creation utilities.
//!
//! This module provides the core expression types for building optimization problems:
//! - `Expr` - The closed set of expression nodes
//! - `Shape` - `(rows, cols)` shape information
//! - Variable creation via `variable()` and `VariableBuilder`
//! - Constant creation via `constant()` and related functions
//! - Parameters via `parameter()`

pub mod constant;
pub mod containers;
pub mod expression;
pub mod parameter;
pub mod shape;
pub mod variable;

// Re-export main types
pub use constant::{
    constant, constant_columns, constant_dmatrix, constant_matrix, constant_sparse, constant_vec,
    named_constant,
};
pub use containers::Variables;
pub use expression::{
    Array, BinaryNode, ConstantData, Expr, ExprId, IndexNode, MulNode, NegNode, ParameterData,
    Side, VariableData,
};
pub use parameter::parameter;
pub use shape::Shape;
pub use variable::{named_variable, variable, VariableBuilder};
