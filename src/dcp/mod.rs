//! DCP (Disciplined Convex Programming) analysis.
//!
//! Curvature tracking (constant, affine, convex, concave, unknown) and the
//! rules combining curvatures under each operator.

pub mod curvature;

pub use curvature::{add_curvature, mul_curvature, sub_curvature, Curvature};
