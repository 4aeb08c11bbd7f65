//! CPU kernel implementations
//!
//! Low-level per-work-item compute kernels. Dispatch over rows and
//! workgroups lives in the ops layer.

pub mod conv;

pub(crate) use conv::{naive_row, tiled_group, vectorized_row};
