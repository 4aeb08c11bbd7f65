//! CPU runtime implementation

use super::client::CpuClient;
use super::device::CpuDevice;
use crate::error::Result;
use crate::runtime::Runtime;

/// CPU compute runtime
///
/// Always available. Work-items run on the host, spread over rayon worker
/// threads when the `rayon` feature is enabled.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;

    fn name() -> &'static str {
        "cpu"
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn try_client(device: &Self::Device) -> Result<Self::Client> {
        Ok(CpuClient::new(device.clone()))
    }
}

impl CpuRuntime {
    /// Create a client for the host device. Never fails.
    pub fn default_client(device: &CpuDevice) -> CpuClient {
        CpuClient::new(device.clone())
    }
}
