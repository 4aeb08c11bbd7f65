//! CPU runtime implementation
//!
//! The CPU runtime is the reference backend. It executes the same work-item
//! decomposition as the accelerator: one work-item per output pixel, and for
//! the tiled strategy, independent workgroups that stage their input in a
//! private scratchpad.
//!
//! # Parallelism
//!
//! With the `rayon` feature, output rows (or row bands of workgroups) are
//! distributed over rayon worker threads. A client can be pinned to a
//! dedicated pool with [`CpuClient::with_parallelism`].

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::{CpuClient, ParallelismConfig};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
