//! WebGPU adapter selection.

use std::fmt;
use std::sync::Arc;
use wgpu::{Adapter, Backend, Limits};

use crate::error::Error;

/// Failure to obtain a usable WebGPU device.
#[derive(Debug, Clone)]
pub enum WgpuError {
    /// No adapter could be enumerated or requested.
    NoAdapter,
    /// The adapter refused the device request.
    DeviceError(String),
}

impl fmt::Display for WgpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WgpuError::NoAdapter => write!(f, "no WebGPU adapter available"),
            WgpuError::DeviceError(msg) => write!(f, "WebGPU device request failed: {}", msg),
        }
    }
}

impl std::error::Error for WgpuError {}

impl From<WgpuError> for Error {
    fn from(err: WgpuError) -> Self {
        Error::Device(err.to_string())
    }
}

/// What haloconv needs to know about the adapter behind a device.
#[derive(Clone, Debug)]
pub(crate) struct AdapterProfile {
    name: String,
    backend: Backend,
    limits: Limits,
}

/// A WebGPU adapter, addressed by its enumeration index.
///
/// A fresh `WgpuDevice::new(i)` is only an address; the clients hand out a
/// copy that also carries the adapter's name, backend and limits.
#[derive(Clone)]
pub struct WgpuDevice {
    pub(crate) index: usize,
    profile: Option<Arc<AdapterProfile>>,
}

impl WgpuDevice {
    /// Address the adapter at `index`. Nothing is initialized until a client
    /// is created for it.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            profile: None,
        }
    }

    pub(crate) fn with_profile(index: usize, profile: Arc<AdapterProfile>) -> Self {
        Self {
            index,
            profile: Some(profile),
        }
    }

    /// Adapter name, once a client has resolved it.
    pub fn adapter_name(&self) -> Option<&str> {
        self.profile.as_deref().map(|p| p.name.as_str())
    }

    /// Graphics API backing the adapter, once resolved.
    pub fn backend(&self) -> Option<Backend> {
        self.profile.as_deref().map(|p| p.backend)
    }

    /// Adapter limits, once resolved.
    pub fn limits(&self) -> Option<&Limits> {
        self.profile.as_deref().map(|p| &p.limits)
    }
}

impl super::super::Device for WgpuDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        match self.adapter_name() {
            Some(adapter) => format!("wgpu:{} ({})", self.index, adapter),
            None => format!("wgpu:{}", self.index),
        }
    }
}

impl fmt::Debug for WgpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuDevice")
            .field("index", &self.index)
            .field("adapter", &self.adapter_name())
            .field("backend", &self.backend())
            .finish()
    }
}

/// Pick the adapter at `index`, or the high-performance adapter when the
/// index is past the end of the enumeration.
pub(crate) async fn select_adapter(
    index: usize,
) -> Result<(Adapter, Arc<AdapterProfile>), WgpuError> {
    let instance = wgpu::Instance::default();
    let mut adapters = instance.enumerate_adapters(wgpu::Backends::all()).await;

    let adapter = if index < adapters.len() {
        adapters.swap_remove(index)
    } else if adapters.is_empty() {
        return Err(WgpuError::NoAdapter);
    } else {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| WgpuError::NoAdapter)?
    };

    let info = adapter.get_info();
    log::info!(
        "selected WebGPU adapter {}: {} ({:?})",
        index,
        info.name,
        info.backend
    );
    let profile = Arc::new(AdapterProfile {
        name: info.name,
        backend: info.backend,
        limits: adapter.limits(),
    });
    Ok((adapter, profile))
}

pub(crate) fn select_adapter_blocking(
    index: usize,
) -> Result<(Adapter, Arc<AdapterProfile>), WgpuError> {
    pollster::block_on(select_adapter(index))
}
