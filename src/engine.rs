//! End-to-end convolution pipeline.
//!
//! A [`ConvolutionEngine`] owns one client and one generated filter and runs
//! decoded images through pad -> convolve -> assemble.

use crate::config::ConvConfig;
use crate::error::Result;
use crate::filter::generate_filter;
use crate::image::{Image, RawImage};
use crate::ops::{ConvOps, Strategy};
use crate::runtime::{Device, Runtime, RuntimeClient};

/// Convolution pipeline bound to one runtime client.
///
/// # Example
///
/// ```ignore
/// use haloconv::prelude::*;
///
/// let engine = ConvolutionEngine::<CpuRuntime>::with_default_device(ConvConfig::default())?;
/// let output = engine.run(&raw)?;
/// ```
pub struct ConvolutionEngine<R: Runtime> {
    client: R::Client,
    config: ConvConfig,
    filter: Image,
}

impl<R: Runtime> ConvolutionEngine<R>
where
    R::Client: ConvOps<R>,
{
    /// Build an engine on `client`, generating the configured filter.
    pub fn new(client: R::Client, config: ConvConfig) -> Result<Self> {
        config.validate()?;
        let filter = generate_filter(config.filter_family, config.filter_width)?;
        log::debug!(
            "engine on {} ({}): filter={} width={} strategy={}",
            R::name(),
            client.device().name(),
            config.filter_family,
            config.filter_width,
            config.strategy
        );
        Ok(Self {
            client,
            config,
            filter,
        })
    }

    /// Build an engine on the runtime's default device.
    ///
    /// Fails with `Error::Device` when the device cannot be initialized.
    pub fn with_default_device(config: ConvConfig) -> Result<Self> {
        let device = R::default_device();
        let client = R::try_client(&device)?;
        Self::new(client, config)
    }

    /// The client work is dispatched on.
    pub fn client(&self) -> &R::Client {
        &self.client
    }

    /// Active configuration.
    pub fn config(&self) -> &ConvConfig {
        &self.config
    }

    /// The generated filter.
    pub fn filter(&self) -> &Image {
        &self.filter
    }

    /// Pad a decoded image with the halo this engine's filter needs.
    pub fn pad(&self, raw: &RawImage) -> Result<Image> {
        raw.to_padded(self.config.halo())
    }

    /// Pad, convolve and assemble one decoded image.
    pub fn run(&self, raw: &RawImage) -> Result<Image> {
        let padded = self.pad(raw)?;
        self.run_padded(&padded)
    }

    /// Convolve an already padded image with the configured strategy.
    pub fn run_padded(&self, padded: &Image) -> Result<Image> {
        self.run_with(padded, self.config.strategy)
    }

    /// Convolve an already padded image with an explicit strategy.
    pub fn run_with(&self, padded: &Image, strategy: Strategy) -> Result<Image> {
        log::debug!("running {} on {}", strategy, R::name());
        self.client.convolve(padded, &self.filter, strategy)
    }

    /// Run all three strategies on one decoded image.
    ///
    /// The tiled run uses the configured workgroup shape, or the default one
    /// when the configured strategy is not tiled. The image is padded once.
    pub fn run_all_strategies(&self, raw: &RawImage) -> Result<Vec<(Strategy, Image)>> {
        let padded = self.pad(raw)?;
        let dims = self.config.strategy.workgroup_dims().unwrap_or_default();
        Strategy::all(dims)
            .into_iter()
            .map(|strategy| Ok((strategy, self.run_with(&padded, strategy)?)))
            .collect()
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::filter::FilterFamily;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn engine(config: ConvConfig) -> ConvolutionEngine<CpuRuntime> {
        ConvolutionEngine::new(CpuRuntime::default_client(&CpuDevice::new()), config).unwrap()
    }

    #[test]
    fn test_engine_identity_preserves_pixels() {
        let raw = RawImage::new((0..36).map(|v| (v * 7) as u8).collect(), 3, 3, 4).unwrap();
        let config = ConvConfig::default()
            .with_filter(FilterFamily::Identity)
            .with_filter_width(3);
        let output = engine(config).run(&raw).unwrap();
        assert_eq!(output.to_rgba8(), raw);
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = ConvConfig::default().with_filter_width(4);
        let result =
            ConvolutionEngine::<CpuRuntime>::new(CpuRuntime::default_client(&CpuDevice::new()), config);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_all_strategies_agree() {
        let raw = RawImage::new((0..5 * 4 * 4).map(|v| (v * 13 % 256) as u8).collect(), 5, 4, 4)
            .unwrap();
        let config = ConvConfig::default().with_filter_width(3);
        let results = engine(config).run_all_strategies(&raw).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1, results[1].1);
        assert_eq!(results[0].1, results[2].1);
    }
}
