//! Runtime backends for convolution dispatch
//!
//! This module defines the `Runtime` trait and provides implementations
//! for the compute backends (host CPU, WebGPU).
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific GPU/CPU)
//! └── Client (dispatches work-items, owns the queue, is the wait point)
//! ```

#[cfg(feature = "cpu")]
pub mod cpu;

#[cfg(feature = "wgpu")]
pub mod wgpu;

use crate::error::Result;

/// Core trait for compute backends
///
/// `Runtime` abstracts over different compute devices (CPU, GPU).
/// It uses static dispatch via generics.
///
/// # Example
///
/// ```ignore
/// use haloconv::runtime::{Runtime, cpu::CpuRuntime};
///
/// let device = CpuRuntime::default_device();
/// let client = CpuRuntime::try_client(&device)?;
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: Device;

    /// Client for dispatching operations
    type Client: RuntimeClient<Self>;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// The device used when the caller does not pick one
    fn default_device() -> Self::Device;

    /// Create (or reuse) a client for a device.
    ///
    /// Fails with `Error::Device` when the device cannot be initialized;
    /// no work is dispatched in that case.
    fn try_client(device: &Self::Device) -> Result<Self::Client>;
}

/// Trait for device identifiers
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device within its runtime
    fn id(&self) -> usize;

    /// Human-readable device name
    fn name(&self) -> String;
}

/// Trait for runtime clients that dispatch work
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Block until all submitted work has completed.
    ///
    /// This is the explicit wait point: failures raised asynchronously by
    /// queued work since the previous wait are returned here.
    fn synchronize(&self) -> Result<()>;
}
