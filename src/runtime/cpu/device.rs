//! The host CPU as a device

use std::num::NonZeroUsize;

use crate::runtime::Device;

/// The host processor. There is exactly one, always at id 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuDevice;

impl CpuDevice {
    /// The host device.
    pub fn new() -> Self {
        CpuDevice
    }

    /// Hardware threads the OS reports for this process (1 if unknown).
    pub fn host_threads(&self) -> usize {
        std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        0
    }

    fn name(&self) -> String {
        format!("cpu ({} threads)", self.host_threads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_device() {
        let device = CpuDevice::new();
        assert_eq!(device.id(), 0);
        assert!(device.host_threads() >= 1);
        assert!(device.name().starts_with("cpu ("));
    }
}
