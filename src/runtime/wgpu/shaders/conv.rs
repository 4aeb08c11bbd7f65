//! Convolution WGSL kernel launchers
//!
//! Provides launchers for the three strategies:
//! - naive (scalar reads)
//! - vectorized (vec4 reads)
//! - tiled (workgroup scratchpad + barrier)
//!
//! Launchers only enqueue work; the caller owns the wait point.

use wgpu::{Buffer, Queue};

use super::generator::{
    DIRECT_WORKGROUP, generate_naive_conv_shader, generate_tiled_conv_shader,
    generate_vectorized_conv_shader, tiled_shader_name,
};
use super::pipeline::{LayoutKey, PipelineCache};
use crate::error::{Error, Result};
use crate::ops::WorkgroupDims;
use crate::ops::conv_common::ConvParams;

/// Buffers bound by every convolution kernel.
pub struct ConvBindings<'a> {
    pub input: &'a Buffer,
    pub filter: &'a Buffer,
    pub output: &'a Buffer,
    pub params: &'a Buffer,
}

const CONV_LAYOUT: LayoutKey = LayoutKey {
    num_storage_buffers: 3,
    num_uniform_buffers: 1,
};

fn dispatch(
    cache: &PipelineCache,
    queue: &Queue,
    shader_name: &str,
    entry_point: &'static str,
    source: impl FnOnce() -> String,
    bindings: &ConvBindings<'_>,
    groups: (usize, usize),
) -> Result<()> {
    let (group_rows, group_cols) = groups;
    let group_rows = u32::try_from(group_rows)
        .map_err(|_| Error::backend_limitation("wgpu", entry_point, "too many workgroup rows"))?;
    let group_cols = u32::try_from(group_cols)
        .map_err(|_| Error::backend_limitation("wgpu", entry_point, "too many workgroup columns"))?;

    let module = cache.get_or_create_module(shader_name, source);
    let layout = cache.get_or_create_layout(CONV_LAYOUT);
    let pipeline = cache.get_or_create_pipeline(shader_name, entry_point, &module, &layout);

    let bind_group = cache.create_bind_group(
        &layout,
        &[
            bindings.input,
            bindings.filter,
            bindings.output,
            bindings.params,
        ],
    );

    let mut encoder = cache
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(entry_point),
        });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(entry_point),
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, Some(&bind_group), &[]);
        // x spans columns, y spans rows
        pass.dispatch_workgroups(group_cols, group_rows, 1);
    }

    queue.submit(std::iter::once(encoder.finish()));
    Ok(())
}

/// Launch the naive kernel over a `params.height x params.width` grid.
pub fn launch_conv_naive(
    cache: &PipelineCache,
    queue: &Queue,
    bindings: &ConvBindings<'_>,
    params: &ConvParams,
) -> Result<()> {
    dispatch(
        cache,
        queue,
        "conv_naive",
        "conv_naive",
        generate_naive_conv_shader,
        bindings,
        DIRECT_WORKGROUP.groups_for(params.height, params.width),
    )
}

/// Launch the vectorized kernel.
pub fn launch_conv_vectorized(
    cache: &PipelineCache,
    queue: &Queue,
    bindings: &ConvBindings<'_>,
    params: &ConvParams,
) -> Result<()> {
    dispatch(
        cache,
        queue,
        "conv_vectorized",
        "conv_vectorized",
        generate_vectorized_conv_shader,
        bindings,
        DIRECT_WORKGROUP.groups_for(params.height, params.width),
    )
}

/// Launch the tiled kernel with `dims`-shaped workgroups.
///
/// Partial groups at the right and bottom edges are dispatched; their
/// out-of-range work-items take part in the load and barrier but write
/// nothing.
pub fn launch_conv_tiled(
    cache: &PipelineCache,
    queue: &Queue,
    bindings: &ConvBindings<'_>,
    params: &ConvParams,
    dims: WorkgroupDims,
) -> Result<()> {
    let halo = params.halo;
    dispatch(
        cache,
        queue,
        &tiled_shader_name(dims, halo),
        "conv_tiled",
        || generate_tiled_conv_shader(dims, halo),
        bindings,
        dims.groups_for(params.height, params.width),
    )
}
