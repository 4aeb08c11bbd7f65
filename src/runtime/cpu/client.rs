//! CPU client and parallelism configuration

#[cfg(feature = "rayon")]
use std::sync::Arc;

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::error::Result;
use crate::runtime::RuntimeClient;

/// Default minimum number of rows handed to one rayon task.
const DEFAULT_MIN_LEN: usize = 1;

/// Thread configuration for a [`CpuClient`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Worker thread count; `None` uses the global rayon pool
    pub max_threads: Option<usize>,
    /// Minimum rows per rayon task; `None` uses the default
    pub min_len: Option<usize>,
}

impl ParallelismConfig {
    /// Create a parallelism configuration
    pub fn new(max_threads: Option<usize>, min_len: Option<usize>) -> Self {
        Self {
            max_threads,
            min_len,
        }
    }
}

/// CPU client for operation dispatch
#[derive(Clone)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    parallelism: ParallelismConfig,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl std::fmt::Debug for CpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuClient")
            .field("device", &self.device)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        Self {
            device,
            parallelism: ParallelismConfig::default(),
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    /// Return a client that runs its work-items under `config`.
    ///
    /// If a dedicated pool cannot be built, the client keeps using the
    /// global rayon pool.
    pub fn with_parallelism(mut self, config: ParallelismConfig) -> Self {
        self.parallelism = config;
        #[cfg(feature = "rayon")]
        {
            self.pool = config.max_threads.and_then(|threads| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("haloconv-cpu-{}", i))
                    .build()
                    .map(Arc::new)
                    .inspect_err(|e| {
                        log::warn!("falling back to global rayon pool: {}", e);
                    })
                    .ok()
            });
        }
        self
    }

    /// Active parallelism configuration
    pub fn parallelism(&self) -> ParallelismConfig {
        self.parallelism
    }

    /// Minimum rows per rayon task
    #[inline]
    pub(crate) fn rayon_min_len(&self) -> usize {
        self.parallelism.min_len.unwrap_or(DEFAULT_MIN_LEN).max(1)
    }

    /// Run `op` inside this client's pool, or the global one.
    #[cfg(feature = "rayon")]
    pub(crate) fn install_parallelism<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        // CPU dispatches complete before returning, nothing is pending
        Ok(())
    }
}
