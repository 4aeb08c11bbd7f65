//! WGSL shader generation for the convolution strategies
//!
//! All three kernels share one parameter block and one binding layout:
//!
//! | binding | contents                      |
//! |---------|-------------------------------|
//! | 0       | padded input (read)           |
//! | 1       | filter taps (read)            |
//! | 2       | unpadded output (read_write)  |
//! | 3       | `ConvParams` uniform          |
//!
//! Every kernel accumulates filter row `r` outer and filter column `k` inner.

use crate::ops::WorkgroupDims;

/// Workgroup shape of the naive and vectorized kernels.
pub const DIRECT_WORKGROUP: WorkgroupDims = WorkgroupDims::new(16, 16);

const PARAMS_STRUCT: &str = r#"struct ConvParams {
    width: u32,
    height: u32,
    padded_width: u32,
    padded_height: u32,
    filter_width: u32,
    halo: u32,
    _pad0: u32,
    _pad1: u32,
}"#;

/// Generate the naive kernel: per-channel scalar reads with manual strides.
pub fn generate_naive_conv_shader() -> String {
    let rows = DIRECT_WORKGROUP.rows;
    let cols = DIRECT_WORKGROUP.cols;
    format!(
        r#"// Auto-generated naive convolution shader

{PARAMS_STRUCT}

@group(0) @binding(0) var<storage, read> conv_input: array<f32>;
@group(0) @binding(1) var<storage, read> conv_filter: array<f32>;
@group(0) @binding(2) var<storage, read_write> conv_output: array<f32>;
@group(0) @binding(3) var<uniform> conv_params: ConvParams;

@compute @workgroup_size({cols}, {rows}, 1)
fn conv_naive(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let col = gid.x;
    let row = gid.y;
    if (col >= conv_params.width || row >= conv_params.height) {{
        return;
    }}

    let fw = conv_params.filter_width;
    let row_stride = conv_params.padded_width * 4u;

    var sum_r: f32 = 0.0;
    var sum_g: f32 = 0.0;
    var sum_b: f32 = 0.0;
    var sum_a: f32 = 0.0;

    for (var r: u32 = 0u; r < fw; r = r + 1u) {{
        for (var k: u32 = 0u; k < fw; k = k + 1u) {{
            let src = (row + r) * row_stride + (col + k) * 4u;
            let f = (r * fw + k) * 4u;
            sum_r = sum_r + conv_input[src] * conv_filter[f];
            sum_g = sum_g + conv_input[src + 1u] * conv_filter[f + 1u];
            sum_b = sum_b + conv_input[src + 2u] * conv_filter[f + 2u];
            sum_a = sum_a + conv_input[src + 3u] * conv_filter[f + 3u];
        }}
    }}

    let dest = (row * conv_params.width + col) * 4u;
    conv_output[dest] = sum_r;
    conv_output[dest + 1u] = sum_g;
    conv_output[dest + 2u] = sum_b;
    conv_output[dest + 3u] = sum_a;
}}
"#
    )
}

/// Generate the vectorized kernel: the buffers are viewed as `vec4<f32>`
/// and each tap is one 4-wide load.
pub fn generate_vectorized_conv_shader() -> String {
    let rows = DIRECT_WORKGROUP.rows;
    let cols = DIRECT_WORKGROUP.cols;
    format!(
        r#"// Auto-generated vectorized convolution shader

{PARAMS_STRUCT}

@group(0) @binding(0) var<storage, read> conv_input: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read> conv_filter: array<vec4<f32>>;
@group(0) @binding(2) var<storage, read_write> conv_output: array<vec4<f32>>;
@group(0) @binding(3) var<uniform> conv_params: ConvParams;

@compute @workgroup_size({cols}, {rows}, 1)
fn conv_vectorized(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let col = gid.x;
    let row = gid.y;
    if (col >= conv_params.width || row >= conv_params.height) {{
        return;
    }}

    let fw = conv_params.filter_width;
    var sum = vec4<f32>(0.0, 0.0, 0.0, 0.0);

    for (var r: u32 = 0u; r < fw; r = r + 1u) {{
        for (var k: u32 = 0u; k < fw; k = k + 1u) {{
            let src = (row + r) * conv_params.padded_width + col + k;
            sum = sum + conv_input[src] * conv_filter[r * fw + k];
        }}
    }}

    conv_output[row * conv_params.width + col] = sum;
}}
"#
    )
}

/// Shader cache name for one tiled variant.
pub fn tiled_shader_name(dims: WorkgroupDims, halo: usize) -> String {
    format!("conv_tiled_{}x{}_h{}", dims.rows, dims.cols, halo)
}

/// Generate the tiled kernel for a workgroup shape and halo.
///
/// The scratchpad size is a compile-time constant of the shader, so each
/// `(dims, halo)` pair is its own module. The group loads the whole
/// `(rows + 2*halo) x (cols + 2*halo)` region with a strided loop, waits on
/// `workgroupBarrier`, and only then lets in-range work-items accumulate.
pub fn generate_tiled_conv_shader(dims: WorkgroupDims, halo: usize) -> String {
    let (pad_rows, pad_cols) = dims.scratchpad_dims(halo);
    let pad_size = pad_rows * pad_cols;
    let group_size = dims.area();
    let tile_rows = dims.rows;
    let tile_cols = dims.cols;

    format!(
        r#"// Auto-generated tiled convolution shader ({tile_rows}x{tile_cols}, halo {halo})

const TILE_ROWS: u32 = {tile_rows}u;
const TILE_COLS: u32 = {tile_cols}u;
const PAD_COLS: u32 = {pad_cols}u;
const PAD_SIZE: u32 = {pad_size}u;
const GROUP_SIZE: u32 = {group_size}u;

{PARAMS_STRUCT}

@group(0) @binding(0) var<storage, read> conv_input: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read> conv_filter: array<vec4<f32>>;
@group(0) @binding(2) var<storage, read_write> conv_output: array<vec4<f32>>;
@group(0) @binding(3) var<uniform> conv_params: ConvParams;

var<workgroup> scratchpad: array<vec4<f32>, {pad_size}>;

@compute @workgroup_size({tile_cols}, {tile_rows}, 1)
fn conv_tiled(
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(local_invocation_index) local_index: u32,
    @builtin(workgroup_id) wid: vec3<u32>
) {{
    let origin_row = wid.y * TILE_ROWS;
    let origin_col = wid.x * TILE_COLS;

    // Cooperative load: interior and halo
    var idx = local_index;
    while (idx < PAD_SIZE) {{
        let src_row = origin_row + idx / PAD_COLS;
        let src_col = origin_col + idx % PAD_COLS;
        if (src_row < conv_params.padded_height && src_col < conv_params.padded_width) {{
            scratchpad[idx] = conv_input[src_row * conv_params.padded_width + src_col];
        }} else {{
            scratchpad[idx] = vec4<f32>(0.0, 0.0, 0.0, 0.0);
        }}
        idx = idx + GROUP_SIZE;
    }}

    workgroupBarrier();

    let row = origin_row + lid.y;
    let col = origin_col + lid.x;
    if (row >= conv_params.height || col >= conv_params.width) {{
        return;
    }}

    let fw = conv_params.filter_width;
    var sum = vec4<f32>(0.0, 0.0, 0.0, 0.0);

    for (var r: u32 = 0u; r < fw; r = r + 1u) {{
        for (var k: u32 = 0u; k < fw; k = k + 1u) {{
            sum = sum + scratchpad[(lid.y + r) * PAD_COLS + lid.x + k] * conv_filter[r * fw + k];
        }}
    }}

    conv_output[row * conv_params.width + col] = sum;
}}
"#
    )
}
