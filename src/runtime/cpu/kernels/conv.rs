//! Convolution kernels
//!
//! One per-pixel accumulation loop ([`convolve_pixel`]) is shared by every
//! strategy; strategies differ only in the [`TapAccess`] that feeds it:
//!
//! - [`ScalarAccess`]: four scalar loads per tap from the padded sample buffer
//! - [`VectorAccess`]: one `[f32; 4]` load per tap from the padded pixel buffer
//! - [`ScratchpadAccess`]: one `[f32; 4]` load per tap from a workgroup scratchpad
//!
//! Each lane accumulates `sum += input * weight` with filter row `r` outer and
//! filter column `k` inner, so all three produce bit-identical output.

use crate::image::{RGBA_CHANNELS, Vec4};
use crate::ops::WorkgroupDims;
use crate::ops::conv_common::ConvParams;

const ZERO: Vec4 = [0.0; RGBA_CHANNELS];

/// Source of neighborhood taps for one work-item.
pub(crate) trait TapAccess {
    /// Accumulate the tap at stored position `(row, col)` weighted by filter
    /// tap `filter_index` into `sum`.
    fn mac(&self, sum: &mut Vec4, row: usize, col: usize, filter_index: usize);
}

/// Shared accumulation loop for the output pixel whose neighborhood starts
/// at stored position `(row, col)` of `access`.
#[inline]
pub(crate) fn convolve_pixel<A: TapAccess>(
    access: &A,
    row: usize,
    col: usize,
    filter_width: usize,
) -> Vec4 {
    let mut sum = ZERO;
    for r in 0..filter_width {
        for k in 0..filter_width {
            access.mac(&mut sum, row + r, col + k, r * filter_width + k);
        }
    }
    sum
}

#[inline(always)]
fn mac4(sum: &mut Vec4, pixel: &Vec4, weight: &Vec4) {
    sum[0] += pixel[0] * weight[0];
    sum[1] += pixel[1] * weight[1];
    sum[2] += pixel[2] * weight[2];
    sum[3] += pixel[3] * weight[3];
}

// ============================================================================
// Naive
// ============================================================================

/// Per-channel scalar reads with manually computed strides.
pub(crate) struct ScalarAccess<'a> {
    pub input: &'a [f32],
    pub filter: &'a [f32],
    /// Samples per padded input row
    pub row_stride: usize,
}

impl TapAccess for ScalarAccess<'_> {
    #[inline(always)]
    fn mac(&self, sum: &mut Vec4, row: usize, col: usize, filter_index: usize) {
        let src = row * self.row_stride + col * RGBA_CHANNELS;
        let f = filter_index * RGBA_CHANNELS;
        sum[0] += self.input[src] * self.filter[f];
        sum[1] += self.input[src + 1] * self.filter[f + 1];
        sum[2] += self.input[src + 2] * self.filter[f + 2];
        sum[3] += self.input[src + 3] * self.filter[f + 3];
    }
}

/// Compute one output row with scalar access.
///
/// `out_row` holds `width * 4` samples of output row `row`.
pub(crate) fn naive_row(
    input: &[f32],
    filter: &[f32],
    params: &ConvParams,
    row: usize,
    out_row: &mut [f32],
) {
    let access = ScalarAccess {
        input,
        filter,
        row_stride: params.padded_width * RGBA_CHANNELS,
    };
    for col in 0..params.width {
        let sum = convolve_pixel(&access, row, col, params.filter_width);
        let dest = col * RGBA_CHANNELS;
        out_row[dest] = sum[0];
        out_row[dest + 1] = sum[1];
        out_row[dest + 2] = sum[2];
        out_row[dest + 3] = sum[3];
    }
}

// ============================================================================
// Vectorized
// ============================================================================

/// One 4-wide read per tap.
pub(crate) struct VectorAccess<'a> {
    pub input: &'a [Vec4],
    pub filter: &'a [Vec4],
    /// Pixels per padded input row
    pub row_stride: usize,
}

impl TapAccess for VectorAccess<'_> {
    #[inline(always)]
    fn mac(&self, sum: &mut Vec4, row: usize, col: usize, filter_index: usize) {
        mac4(
            sum,
            &self.input[row * self.row_stride + col],
            &self.filter[filter_index],
        );
    }
}

/// Compute one output row with vector access.
pub(crate) fn vectorized_row(
    input: &[Vec4],
    filter: &[Vec4],
    params: &ConvParams,
    row: usize,
    out_row: &mut [Vec4],
) {
    let access = VectorAccess {
        input,
        filter,
        row_stride: params.padded_width,
    };
    for (col, out) in out_row.iter_mut().enumerate() {
        *out = convolve_pixel(&access, row, col, params.filter_width);
    }
}

// ============================================================================
// Tiled
// ============================================================================

/// Private per-workgroup copy of the padded input region a group reads.
///
/// Shaped `(rows + 2*halo) x (cols + 2*halo)`. Lives for one workgroup.
pub(crate) struct Scratchpad {
    tiles: Vec<Vec4>,
    rows: usize,
    cols: usize,
}

impl Scratchpad {
    pub(crate) fn new(dims: WorkgroupDims, halo: usize) -> Self {
        let (rows, cols) = dims.scratchpad_dims(halo);
        Self {
            tiles: vec![ZERO; rows * cols],
            rows,
            cols,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Cooperative load performed by one work-item.
    ///
    /// Work-item `local_index` of a group of `group_size` copies scratchpad
    /// entries `local_index, local_index + group_size, ...`, so the group as a
    /// whole covers the interior and the halo. Entries that fall outside the
    /// padded input (partial groups at the right/bottom edge) are zeroed; no
    /// in-range work-item reads them.
    pub(crate) fn load_share(
        &mut self,
        input: &[Vec4],
        params: &ConvParams,
        origin: (usize, usize),
        local_index: usize,
        group_size: usize,
    ) {
        for idx in (local_index..self.len()).step_by(group_size) {
            let src_row = origin.0 + idx / self.cols;
            let src_col = origin.1 + idx % self.cols;
            self.tiles[idx] = if src_row < params.padded_height && src_col < params.padded_width {
                input[src_row * params.padded_width + src_col]
            } else {
                ZERO
            };
        }
    }
}

/// Taps read from a workgroup scratchpad.
pub(crate) struct ScratchpadAccess<'a> {
    pub scratchpad: &'a Scratchpad,
    pub filter: &'a [Vec4],
}

impl TapAccess for ScratchpadAccess<'_> {
    #[inline(always)]
    fn mac(&self, sum: &mut Vec4, row: usize, col: usize, filter_index: usize) {
        mac4(
            sum,
            &self.scratchpad.tiles[row * self.scratchpad.cols + col],
            &self.filter[filter_index],
        );
    }
}

/// Execute one workgroup of the tiled strategy.
///
/// `band` holds the output rows `group_row * dims.rows ..` (at most
/// `dims.rows` of them); the group writes its columns
/// `group_col * dims.cols ..` of that band.
///
/// The group runs in two phases. Every work-item first loads its share of
/// the scratchpad; only after the whole load phase has finished (the group
/// barrier) does any work-item read the scratchpad to accumulate.
///
/// `dims` is clamped to the image first, so the scratchpad never exceeds the
/// padded input however large the requested group is.
pub(crate) fn tiled_group(
    input: &[Vec4],
    filter: &[Vec4],
    params: &ConvParams,
    dims: WorkgroupDims,
    group: (usize, usize),
    band: &mut [Vec4],
) {
    let dims = dims.clamped_to(params.height, params.width);
    let origin = (group.0 * dims.rows, group.1 * dims.cols);
    let group_size = dims.area();
    let mut scratchpad = Scratchpad::new(dims, params.halo);

    for local_index in 0..group_size {
        scratchpad.load_share(input, params, origin, local_index, group_size);
    }

    // barrier: scratchpad is read-only from here on
    let access = ScratchpadAccess {
        scratchpad: &scratchpad,
        filter,
    };
    for local_row in 0..dims.rows {
        let row = origin.0 + local_row;
        if row >= params.height {
            break;
        }
        for local_col in 0..dims.cols {
            let col = origin.1 + local_col;
            if col >= params.width {
                break;
            }
            band[local_row * params.width + col] =
                convolve_pixel(&access, local_row, local_col, params.filter_width);
        }
    }
}
