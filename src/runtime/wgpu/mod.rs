//! WebGPU runtime (requires `wgpu` feature)
//!
//! Runs the convolution strategies as WGSL compute shaders on any adapter
//! WebGPU can reach (Vulkan, Metal, DX12, GL).
//!
//! # Usage
//!
//! ```ignore
//! use haloconv::runtime::Runtime;
//! use haloconv::runtime::wgpu::{WgpuRuntime, is_wgpu_available};
//!
//! if is_wgpu_available() {
//!     let device = WgpuRuntime::default_device();
//!     let client = WgpuRuntime::try_client(&device)?;
//! }
//! ```

mod cache;
mod client;
mod device;
mod runtime;
pub(crate) mod shaders;

pub use client::WgpuClient;
pub use device::{WgpuDevice, WgpuError};
pub use runtime::{WgpuRuntime, is_wgpu_available, wgpu_device, wgpu_device_id};
