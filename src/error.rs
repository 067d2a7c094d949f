//! Error types for cvxexpr.
//!
//! The messages of the first three variants are part of the public contract
//! and are matched verbatim by callers.

use thiserror::Error;

use crate::expr::Shape;

/// Error type for cvxexpr operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CvxError {
    /// Operand shapes cannot be combined by the requested operator.
    #[error("Incompatible dimensions.")]
    IncompatibleDimensions { lhs: Shape, rhs: Shape },

    /// Neither factor of a product is constant.
    #[error("Cannot multiply on the left by a non-constant.")]
    NonConstantMultiplier,

    /// Index outside the bounds of the indexed expression.
    #[error("Invalid indices {row},{col} for '{name}'.")]
    InvalidIndex { row: usize, col: usize, name: String },

    /// Malformed constant data or an empty shape.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A parameter was evaluated before being given a value.
    #[error("Parameter '{0}' has no value.")]
    UnboundParameter(String),
}

/// Result type for cvxexpr operations.
pub type Result<T> = std::result::Result<T, CvxError>;
