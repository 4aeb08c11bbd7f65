//! Convolution operations
//!
//! Operations are defined as traits implemented by each backend's
//! `RuntimeClient`, so the caller picks a backend and a [`Strategy`] and gets
//! bit-for-bit the same image from every strategy of that backend.
//!
//! ```text
//! RuntimeClient<R>
//!   └── implements ConvOps<R>
//!         └── convolve(input, filter, strategy)
//!               ├── Strategy::Naive       (4 scalar reads per tap)
//!               ├── Strategy::Vectorized  (1 vec4 read per tap)
//!               └── Strategy::Tiled(dims) (group scratchpad + barrier)
//! ```
//!
//! Shared validation lives in [`conv_common`]; backends only add their own
//! hardware limits on top.

pub mod conv_common;
mod traits;

#[cfg(feature = "cpu")]
pub(crate) mod cpu;
#[cfg(feature = "wgpu")]
pub(crate) mod wgpu;

pub use traits::*;
