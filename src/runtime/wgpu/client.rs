//! WebGPU Client implementation.
//!
//! `WgpuClient` owns the WebGPU device and queue for kernel dispatch.
//!
//! # Thread Safety
//!
//! `WgpuClient` is `Clone` and the underlying wgpu::Device and wgpu::Queue
//! are already `Send + Sync`.
//!
//! # Failure reporting
//!
//! Work is enqueued without blocking. Failures raised by the device
//! (validation and out-of-memory errors, device loss) or while waiting
//! (poll timeouts, failed buffer maps) are collected by the client and
//! returned from the next wait point: [`RuntimeClient::synchronize`]
//! or [`WgpuClient::read_buffer`].

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, Device, Queue};

use super::WgpuRuntime;
use super::device::{WgpuDevice, WgpuError, select_adapter_blocking};
use super::shaders::PipelineCache;
use crate::error::{Error, Result};
use crate::runtime::{Device as _, RuntimeClient};

/// Upper bound on a single blocking wait.
const WAIT_TIMEOUT: Duration = Duration::from_secs(60);

type FaultSink = Arc<Mutex<Vec<String>>>;

/// Route validation errors, out-of-memory errors and device loss into
/// `faults` instead of wgpu's default handler, which panics.
fn install_fault_handlers(device: &Device, faults: &FaultSink) {
    let sink = faults.clone();
    let on_error: Box<dyn wgpu::UncapturedErrorHandler> = Box::new(move |error: wgpu::Error| {
        log::error!("WebGPU uncaptured error: {}", error);
        sink.lock().push(error.to_string());
    });
    device.on_uncaptured_error(on_error.into());

    let sink = faults.clone();
    device.set_device_lost_callback(move |reason, message| {
        log::error!("WebGPU device lost: reason={:?}, message={}", reason, message);
        sink.lock()
            .push(format!("device lost ({:?}): {}", reason, message));
    });
}

// ============================================================================
// WgpuClient
// ============================================================================

/// WebGPU Runtime Client.
///
/// Owns the WebGPU device and queue. All convolution launches are submitted
/// through this client's queue.
///
/// # Buffer Management
///
/// Storage buffers hold image and filter data, staging buffers carry results
/// back to the host. Buffers are created per dispatch and dropped with it.
#[derive(Clone)]
pub struct WgpuClient {
    /// GPU device identifier
    pub(crate) device_id: WgpuDevice,

    /// WebGPU device handle
    pub(crate) wgpu_device: Arc<Device>,

    /// WebGPU queue for command submission
    pub(crate) queue: Arc<Queue>,

    /// Pipeline cache for compute shaders
    pub(crate) pipeline_cache: Arc<PipelineCache>,

    /// Asynchronous failures not yet reported at a wait point
    faults: FaultSink,
}

impl std::fmt::Debug for WgpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuClient")
            .field("device", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl WgpuClient {
    /// Get or create the shared WebGPU client for a device.
    ///
    /// Clients are cached per adapter index, so repeated calls reuse the
    /// same device, queue and pipeline cache.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No suitable GPU adapter is found
    /// - Device creation fails
    pub fn new(device: WgpuDevice) -> std::result::Result<Self, WgpuError> {
        super::cache::get_or_create_client(&device)
    }

    /// Create a new client that does not go through the client cache.
    pub(crate) fn new_uncached(device: WgpuDevice) -> std::result::Result<Self, WgpuError> {
        let (adapter, profile) = select_adapter_blocking(device.index)?;

        // Ask for everything the adapter offers so larger workgroups fit
        let required_limits = adapter.limits();
        let (wgpu_device, queue) = pollster::block_on(async {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("haloconv WebGPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                    trace: wgpu::Trace::Off,
                    experimental_features: wgpu::ExperimentalFeatures::default(),
                })
                .await
        })
        .map_err(|e| WgpuError::DeviceError(format!("{:?}", e)))?;

        let faults = Arc::new(Mutex::new(Vec::new()));
        install_fault_handlers(&wgpu_device, &faults);

        let wgpu_device = Arc::new(wgpu_device);
        let queue = Arc::new(queue);
        let pipeline_cache = Arc::new(PipelineCache::new(wgpu_device.clone()));
        let resolved = WgpuDevice::with_profile(device.index, profile);
        log::debug!("WebGPU client ready on {}", resolved.name());

        Ok(Self {
            device_id: resolved,
            wgpu_device,
            queue,
            pipeline_cache,
            faults,
        })
    }

    /// Get reference to the WebGPU device.
    #[inline]
    pub fn wgpu_device(&self) -> &Device {
        &self.wgpu_device
    }

    /// Get reference to the WebGPU queue.
    #[inline]
    pub fn wgpu_queue(&self) -> &Queue {
        &self.queue
    }

    /// Get reference to the pipeline cache.
    #[inline]
    pub fn pipeline_cache(&self) -> &PipelineCache {
        &self.pipeline_cache
    }

    /// Limits the device was created with.
    pub fn limits(&self) -> wgpu::Limits {
        self.wgpu_device.limits()
    }

    /// Create a storage buffer.
    ///
    /// Storage buffers can be read/written by compute shaders.
    pub fn create_storage_buffer(&self, label: &str, size: u64) -> Buffer {
        self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    /// Create a staging buffer for CPU readback.
    pub fn create_staging_buffer(&self, label: &str, size: u64) -> Buffer {
        self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a uniform buffer holding `data`.
    pub fn create_uniform_buffer<T: bytemuck::Pod>(&self, label: &str, data: &T) -> Buffer {
        let buffer = self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<T>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(&buffer, 0, bytemuck::bytes_of(data));
        buffer
    }

    /// Write data to a buffer.
    pub fn write_buffer<T: bytemuck::Pod>(&self, buffer: &Buffer, data: &[T]) {
        self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
    }

    /// Submit commands and wait for completion.
    pub fn submit_and_wait(&self, encoder: wgpu::CommandEncoder) -> Result<()> {
        let submission = self.queue.submit(std::iter::once(encoder.finish()));
        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: Some(WAIT_TIMEOUT),
            })
            .map_err(|e| Error::Execution(format!("GPU poll failed: {e}")))?;
        self.take_faults()
    }

    /// Copy `size` bytes of `source` into a fresh staging buffer and read
    /// them back as `T`.
    pub fn download<T: bytemuck::Pod + Default>(
        &self,
        source: &Buffer,
        len: usize,
    ) -> Result<Vec<T>> {
        let size = (len * std::mem::size_of::<T>()) as u64;
        let staging = self.create_staging_buffer("download_staging", size);

        let mut encoder = self
            .wgpu_device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("download"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
        self.submit_and_wait(encoder)?;

        let mut output = vec![T::default(); len];
        self.read_buffer(&staging, &mut output)?;
        Ok(output)
    }

    /// Read buffer data back to CPU (blocking).
    pub fn read_buffer<T: bytemuck::Pod>(&self, staging: &Buffer, output: &mut [T]) -> Result<()> {
        let slice = staging.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(WAIT_TIMEOUT),
            })
            .map_err(|e| Error::Execution(format!("GPU poll failed during buffer read: {e}")))?;

        let map_result = receiver.recv().map_err(|_| {
            Error::Execution("map_async callback was not invoked during buffer read".into())
        })?;
        map_result
            .map_err(|e| Error::Execution(format!("map_async failed during buffer read: {e}")))?;
        self.take_faults()?;

        {
            let data = slice.get_mapped_range();
            let src: &[T] = bytemuck::cast_slice(&data);
            output.copy_from_slice(&src[..output.len()]);
        }

        staging.unmap();
        Ok(())
    }

    /// Report collected asynchronous failures, clearing them.
    fn take_faults(&self) -> Result<()> {
        let mut faults = self.faults.lock();
        if faults.is_empty() {
            return Ok(());
        }
        let message = faults.join("; ");
        faults.clear();
        Err(Error::Execution(message))
    }

    #[cfg(test)]
    pub(crate) fn record_fault(&self, message: &str) {
        self.faults.lock().push(message.to_string());
    }
}

impl RuntimeClient<WgpuRuntime> for WgpuClient {
    fn device(&self) -> &WgpuDevice {
        &self.device_id
    }

    fn synchronize(&self) -> Result<()> {
        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(WAIT_TIMEOUT),
            })
            .map_err(|e| Error::Execution(format!("GPU poll failed: {e}")))?;
        self.take_faults()
    }
}

// ============================================================================
// Tests
// ============================================================================
