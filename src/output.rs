//! Output assembly.
//!
//! Every output pixel belongs to exactly one work-item. On the host the output
//! buffer is split into disjoint row partitions, one per task, so no two tasks
//! can write the same element. Accelerator results are only turned into an
//! [`Image`] after the wait point reported success.

use crate::error::{Error, Result};
use crate::image::{Image, RGBA_CHANNELS};
use crate::ops::Strategy;
use crate::ops::conv_common::ConvParams;

/// Pixels per disjoint output partition for a strategy.
///
/// Naive and vectorized work-items are partitioned by output row; tiled
/// workgroups by bands of `dims.rows` rows (clamped to the image height),
/// which hold whole workgroups.
pub(crate) fn partition_pixels(strategy: Strategy, params: &ConvParams) -> usize {
    match strategy {
        Strategy::Naive | Strategy::Vectorized => params.width,
        Strategy::Tiled(dims) => dims.clamped_to(params.height, params.width).rows * params.width,
    }
}

/// Wrap samples read back from a device into the unpadded output image.
#[cfg_attr(not(feature = "wgpu"), allow(dead_code))]
pub(crate) fn assemble(samples: Vec<f32>, params: &ConvParams) -> Result<Image> {
    let expected = params.output_pixels() * RGBA_CHANNELS;
    if samples.len() != expected {
        return Err(Error::Internal(format!(
            "output readback holds {} samples, expected {}",
            samples.len(),
            expected
        )));
    }
    Image::from_vec(samples, params.width, params.height, RGBA_CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::WorkgroupDims;

    fn params() -> ConvParams {
        ConvParams {
            width: 5,
            height: 3,
            padded_width: 7,
            padded_height: 5,
            filter_width: 3,
            halo: 1,
        }
    }

    #[test]
    fn test_partition_pixels() {
        let p = params();
        assert_eq!(partition_pixels(Strategy::Naive, &p), 5);
        assert_eq!(partition_pixels(Strategy::Vectorized, &p), 5);
        assert_eq!(
            partition_pixels(Strategy::Tiled(WorkgroupDims::new(2, 4)), &p),
            10
        );
        // Taller than the image: one band holding the whole output
        assert_eq!(
            partition_pixels(Strategy::Tiled(WorkgroupDims::new(1000, 4)), &p),
            15
        );
    }

    #[test]
    fn test_assemble_checks_length() {
        let p = params();
        let image = assemble(vec![1.0; 60], &p).unwrap();
        assert_eq!(image.width(), 5);
        assert_eq!(image.height(), 3);
        assert_eq!(image.halo(), 0);
        assert!(matches!(assemble(vec![1.0; 59], &p), Err(Error::Internal(_))));
    }
}
