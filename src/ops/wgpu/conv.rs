//! WebGPU implementation of convolution operations.

use crate::error::{Error, Result};
use crate::image::{Image, RGBA_CHANNELS};
use crate::ops::conv_common::{ConvParams, validate_convolve};
use crate::ops::{ConvOps, Strategy};
use crate::output::assemble;
use crate::runtime::RuntimeClient;
use crate::runtime::wgpu::shaders::conv::{self as conv_launcher, ConvBindings};
use crate::runtime::wgpu::shaders::generator::DIRECT_WORKGROUP;
use crate::runtime::wgpu::{WgpuClient, WgpuRuntime};

/// Bytes per RGBA f32 pixel.
const PIXEL_BYTES: u64 = (RGBA_CHANNELS * std::mem::size_of::<f32>()) as u64;

// ============================================================================
// Params Structs (must match WGSL shader structs)
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ConvUniform {
    width: u32,
    height: u32,
    padded_width: u32,
    padded_height: u32,
    filter_width: u32,
    halo: u32,
    _pad0: u32,
    _pad1: u32,
}

impl ConvUniform {
    fn from_params(params: &ConvParams) -> Result<Self> {
        let narrow = |value: usize, field: &str| {
            u32::try_from(value).map_err(|_| {
                Error::backend_limitation("wgpu", "convolve", format!("{field} {value} exceeds u32"))
            })
        };
        Ok(Self {
            width: narrow(params.width, "width")?,
            height: narrow(params.height, "height")?,
            padded_width: narrow(params.padded_width, "padded width")?,
            padded_height: narrow(params.padded_height, "padded height")?,
            filter_width: narrow(params.filter_width, "filter width")?,
            halo: narrow(params.halo, "halo")?,
            _pad0: 0,
            _pad1: 0,
        })
    }
}

// ============================================================================
// Device limits
// ============================================================================

fn limitation(reason: String) -> Error {
    Error::backend_limitation("wgpu", "convolve", reason)
}

/// Reject a dispatch the device cannot run, before anything is enqueued.
fn check_limits(limits: &wgpu::Limits, params: &ConvParams, strategy: Strategy) -> Result<()> {
    let dims = strategy.workgroup_dims().unwrap_or(DIRECT_WORKGROUP);

    if dims.area() > limits.max_compute_invocations_per_workgroup as usize {
        return Err(limitation(format!(
            "workgroup {} has {} invocations, device allows {}",
            dims,
            dims.area(),
            limits.max_compute_invocations_per_workgroup
        )));
    }
    if dims.cols > limits.max_compute_workgroup_size_x as usize
        || dims.rows > limits.max_compute_workgroup_size_y as usize
    {
        return Err(limitation(format!(
            "workgroup {} exceeds device shape {}x{}",
            dims, limits.max_compute_workgroup_size_y, limits.max_compute_workgroup_size_x
        )));
    }

    if let Strategy::Tiled(dims) = strategy {
        let (pad_rows, pad_cols) = dims.scratchpad_dims(params.halo);
        let scratch_bytes = ((pad_rows * pad_cols) as u64).saturating_mul(PIXEL_BYTES);
        if scratch_bytes > limits.max_compute_workgroup_storage_size as u64 {
            return Err(limitation(format!(
                "scratchpad {}x{} needs {} bytes of workgroup storage, device allows {}",
                pad_rows, pad_cols, scratch_bytes, limits.max_compute_workgroup_storage_size
            )));
        }
    }

    let (group_rows, group_cols) = dims.groups_for(params.height, params.width);
    let max_groups = limits.max_compute_workgroups_per_dimension as usize;
    if group_rows > max_groups || group_cols > max_groups {
        return Err(limitation(format!(
            "{}x{} workgroups exceed {} per dimension",
            group_rows, group_cols, max_groups
        )));
    }

    let max_binding = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
    for (buffer, pixels) in [
        ("padded input", params.input_pixels()),
        ("filter", params.taps()),
        ("output", params.output_pixels()),
    ] {
        let bytes = (pixels as u64).saturating_mul(PIXEL_BYTES);
        if bytes > max_binding {
            return Err(limitation(format!(
                "{} of {} bytes exceeds storage binding limit {}",
                buffer, bytes, max_binding
            )));
        }
    }

    Ok(())
}

// ============================================================================
// ConvOps
// ============================================================================

impl ConvOps<WgpuRuntime> for WgpuClient {
    fn convolve(&self, input: &Image, filter: &Image, strategy: Strategy) -> Result<Image> {
        let params = validate_convolve(input, filter, strategy)?;
        check_limits(&self.limits(), &params, strategy)?;
        let uniform = ConvUniform::from_params(&params)?;

        log::debug!(
            "wgpu convolve {}: {}x{} image, {}x{} filter",
            strategy,
            params.width,
            params.height,
            params.filter_width,
            params.filter_width
        );

        let input_buffer =
            self.create_storage_buffer("conv_input", params.input_pixels() as u64 * PIXEL_BYTES);
        self.write_buffer(&input_buffer, input.data());
        let filter_buffer =
            self.create_storage_buffer("conv_filter", params.taps() as u64 * PIXEL_BYTES);
        self.write_buffer(&filter_buffer, filter.data());
        let output_len = params.output_pixels() * RGBA_CHANNELS;
        let output_buffer =
            self.create_storage_buffer("conv_output", params.output_pixels() as u64 * PIXEL_BYTES);
        let params_buffer = self.create_uniform_buffer("conv_params", &uniform);

        let bindings = ConvBindings {
            input: &input_buffer,
            filter: &filter_buffer,
            output: &output_buffer,
            params: &params_buffer,
        };
        let cache = self.pipeline_cache();
        let queue = self.wgpu_queue();
        match strategy {
            Strategy::Naive => conv_launcher::launch_conv_naive(cache, queue, &bindings, &params)?,
            Strategy::Vectorized => {
                conv_launcher::launch_conv_vectorized(cache, queue, &bindings, &params)?
            }
            Strategy::Tiled(dims) => {
                conv_launcher::launch_conv_tiled(cache, queue, &bindings, &params, dims)?
            }
        }

        // Wait point: nothing is assembled unless the queue drained cleanly
        self.synchronize()?;
        let samples: Vec<f32> = self.download(&output_buffer, output_len)?;
        assemble(samples, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterFamily, generate_filter};
    use crate::ops::WorkgroupDims;
    use crate::runtime::wgpu::WgpuDevice;

    /// A client outside the shared cache, so tests may break its pipelines.
    fn private_client() -> Option<WgpuClient> {
        match WgpuClient::new_uncached(WgpuDevice::new(0)) {
            Ok(client) => Some(client),
            Err(e) => {
                println!("No GPU available, skipping test: {}", e);
                None
            }
        }
    }

    fn blur_case() -> (Image, Image) {
        let filter = generate_filter(FilterFamily::Blur, 3).unwrap();
        let input = Image::filled(6, 5, RGBA_CHANNELS, 10.0).padded(1).unwrap();
        (input, filter)
    }

    fn params(width: usize, height: usize, halo: usize) -> ConvParams {
        ConvParams {
            width,
            height,
            padded_width: width + 2 * halo,
            padded_height: height + 2 * halo,
            filter_width: 2 * halo + 1,
            halo,
        }
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<ConvUniform>(), 32);
        let uniform = ConvUniform::from_params(&params(7, 5, 1)).unwrap();
        assert_eq!(uniform.width, 7);
        assert_eq!(uniform.padded_height, 7);
        assert_eq!(uniform.filter_width, 3);
    }

    #[test]
    fn test_default_limits_accept_default_tiling() {
        let limits = wgpu::Limits::default();
        let p = params(64, 64, 5);
        for strategy in Strategy::all(WorkgroupDims::default()) {
            assert!(check_limits(&limits, &p, strategy).is_ok());
        }
    }

    #[test]
    fn test_oversized_workgroup_is_backend_limitation() {
        let limits = wgpu::Limits::default();
        let strategy = Strategy::Tiled(WorkgroupDims::new(64, 64));
        match check_limits(&limits, &params(8, 8, 1), strategy) {
            Err(Error::BackendLimitation { backend, .. }) => assert_eq!(backend, "wgpu"),
            other => panic!("expected backend limitation, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_scratchpad_is_backend_limitation() {
        let limits = wgpu::Limits::default();
        // 16x16 group with halo 30: 76*76*16 bytes, well above the default 16 KiB
        let strategy = Strategy::Tiled(WorkgroupDims::new(16, 16));
        let err = check_limits(&limits, &params(8, 8, 30), strategy).unwrap_err();
        assert!(err.to_string().contains("workgroup storage"));
    }

    #[test]
    fn test_oversized_output_is_backend_limitation() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: 1024,
            ..wgpu::Limits::default()
        };
        let err = check_limits(&limits, &params(32, 32, 0), Strategy::Naive).unwrap_err();
        assert!(matches!(err, Error::BackendLimitation { .. }));
    }

    #[test]
    fn test_invalid_kernel_is_reported_at_wait_point() {
        let Some(client) = private_client() else {
            return;
        };
        // Shadow the naive kernel with WGSL that does not parse
        client
            .pipeline_cache()
            .get_or_create_module("conv_naive", || "fn conv_naive( {".to_string());

        let (input, filter) = blur_case();
        match client.convolve(&input, &filter, Strategy::Naive) {
            Err(Error::Execution(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected execution error, got {:?}", other),
        }
    }

    #[test]
    fn test_kernels_are_compiled_once() {
        let Some(client) = private_client() else {
            return;
        };
        let (input, filter) = blur_case();

        for _ in 0..2 {
            for strategy in Strategy::all(WorkgroupDims::new(8, 8)) {
                client.convolve(&input, &filter, strategy).unwrap();
            }
        }
        assert_eq!(client.pipeline_cache().module_count(), 3);

        // A new tile shape is a new tiled variant
        client
            .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(4, 4)))
            .unwrap();
        assert_eq!(client.pipeline_cache().module_count(), 4);
    }
}
