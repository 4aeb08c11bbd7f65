//! # haloconv
//!
//! **Halo-padded 2D convolution of RGBA images on CPU and WebGPU backends.**
//!
//! haloconv filters 4-channel images with identity, box-blur and edge
//! kernels. The same convolution is available through three kernel
//! strategies that trade memory traffic for complexity and produce
//! identical output:
//!
//! - **Naive**: four scalar reads per filter tap
//! - **Vectorized**: one 4-wide read per filter tap
//! - **Tiled**: workgroups stage their input region, halo included, in a
//!   shared scratchpad and synchronize on a barrier before computing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use haloconv::prelude::*;
//!
//! let raw = PngCodec.decode("input.png".as_ref())?;
//! let engine = ConvolutionEngine::<CpuRuntime>::with_default_device(ConvConfig::default())?;
//! let output = engine.run(&raw)?;
//! PngCodec.encode(&output.to_rgba8(), "output.png".as_ref())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): host backend
//! - `rayon` (default): multi-threaded host work-items
//! - `png` (default): PNG codec
//! - `wgpu`: cross-platform GPU via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "png")]
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod image;
pub mod ops;
pub(crate) mod output;
pub mod runtime;

/// Runtime used when the caller does not pick one: WebGPU when enabled,
/// otherwise the host CPU.
#[cfg(feature = "wgpu")]
pub type DefaultRuntime = runtime::wgpu::WgpuRuntime;

/// Runtime used when the caller does not pick one: WebGPU when enabled,
/// otherwise the host CPU.
#[cfg(all(feature = "cpu", not(feature = "wgpu")))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ConvConfig;
    pub use crate::engine::ConvolutionEngine;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::filter::{FilterFamily, generate_filter};
    pub use crate::image::{Image, RawImage};
    pub use crate::ops::{ConvOps, Strategy, WorkgroupDims};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};

    #[cfg(feature = "png")]
    pub use crate::codec::{ImageCodec, PngCodec};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::CpuRuntime;

    #[cfg(feature = "wgpu")]
    pub use crate::runtime::wgpu::WgpuRuntime;
}
