//! Run configuration.
//!
//! [`ConvConfig`] names the filter to generate and the strategy to run it
//! with. Defaults match a blur of width 11 on 16x16 tiles.

use crate::error::{Error, Result};
use crate::filter::{FilterFamily, validate_filter_width};
use crate::ops::conv_common::validate_workgroup;
use crate::ops::{Strategy, WorkgroupDims};

/// Environment variable selecting the filter family.
pub const ENV_FILTER: &str = "HALOCONV_FILTER";
/// Environment variable selecting the (odd) filter width.
pub const ENV_FILTER_WIDTH: &str = "HALOCONV_FILTER_WIDTH";
/// Environment variable selecting the strategy (`naive`, `vectorized`, `tiled`).
pub const ENV_STRATEGY: &str = "HALOCONV_STRATEGY";
/// Environment variable selecting the tiled workgroup shape (`ROWSxCOLS`).
pub const ENV_WORKGROUP: &str = "HALOCONV_WORKGROUP";

/// Default filter width.
pub const DEFAULT_FILTER_WIDTH: usize = 11;

/// Filter and strategy selection for a [`ConvolutionEngine`](crate::engine::ConvolutionEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvConfig {
    /// Filter family to generate
    pub filter_family: FilterFamily,
    /// Filter width, odd
    pub filter_width: usize,
    /// Kernel execution strategy
    pub strategy: Strategy,
}

impl Default for ConvConfig {
    fn default() -> Self {
        Self {
            filter_family: FilterFamily::Blur,
            filter_width: DEFAULT_FILTER_WIDTH,
            strategy: Strategy::default(),
        }
    }
}

impl ConvConfig {
    /// Set the filter family.
    pub fn with_filter(mut self, family: FilterFamily) -> Self {
        self.filter_family = family;
        self
    }

    /// Set the filter width.
    pub fn with_filter_width(mut self, width: usize) -> Self {
        self.filter_width = width;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Halo the input must be padded with: the filter half width.
    #[inline]
    pub fn halo(&self) -> usize {
        self.filter_width / 2
    }

    /// Check the filter width and, for tiled runs, the workgroup shape.
    pub fn validate(&self) -> Result<()> {
        validate_filter_width(self.filter_width)?;
        if let Strategy::Tiled(dims) = self.strategy {
            validate_workgroup(dims, self.halo())?;
        }
        Ok(())
    }

    /// Defaults overlaid with the `HALOCONV_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// `HALOCONV_WORKGROUP` applies to the tiled strategy only and is an
    /// error when set alongside a non-tiled strategy.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(family) = lookup(ENV_FILTER) {
            config.filter_family = family.parse()?;
        }
        if let Some(width) = lookup(ENV_FILTER_WIDTH) {
            config.filter_width = width.trim().parse().map_err(|_| {
                Error::invalid_argument(
                    "filter_width",
                    format!("'{}' is not a non-negative integer", width),
                )
            })?;
        }
        if let Some(strategy) = lookup(ENV_STRATEGY) {
            config.strategy = strategy.parse()?;
        }
        if let Some(workgroup) = lookup(ENV_WORKGROUP) {
            let dims: WorkgroupDims = workgroup.parse()?;
            config.strategy = match config.strategy {
                Strategy::Tiled(_) => Strategy::Tiled(dims),
                other => {
                    return Err(Error::invalid_argument(
                        "workgroup",
                        format!("workgroup shape {} given for strategy {}", dims, other),
                    ));
                }
            };
        }

        config.validate()?;
        log::debug!(
            "config: filter={} width={} strategy={}",
            config.filter_family,
            config.filter_width,
            config.strategy
        );
        Ok(config)
    }
}
