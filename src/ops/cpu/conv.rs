//! CPU implementation of convolution operations.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::Result;
use crate::image::{Image, RGBA_CHANNELS};
use crate::ops::conv_common::validate_convolve;
use crate::ops::{ConvOps, Strategy};
use crate::output::partition_pixels;
use crate::runtime::cpu::{CpuClient, CpuRuntime, kernels};

impl ConvOps<CpuRuntime> for CpuClient {
    fn convolve(&self, input: &Image, filter: &Image, strategy: Strategy) -> Result<Image> {
        let params = validate_convolve(input, filter, strategy)?;
        let mut output = Image::zeros(params.width, params.height, RGBA_CHANNELS);
        let chunk_pixels = partition_pixels(strategy, &params);

        log::debug!(
            "cpu convolve {}: {}x{} image, {}x{} filter",
            strategy,
            params.width,
            params.height,
            params.filter_width,
            params.filter_width
        );

        match strategy {
            Strategy::Naive => {
                let (input, filter) = (input.data(), filter.data());
                for_each_partition(
                    self,
                    output.data_mut(),
                    chunk_pixels * RGBA_CHANNELS,
                    |row, out_row| kernels::naive_row(input, filter, &params, row, out_row),
                );
            }
            Strategy::Vectorized => {
                let (input, filter) = (input.as_vec4()?, filter.as_vec4()?);
                for_each_partition(self, output.as_vec4_mut()?, chunk_pixels, |row, out_row| {
                    kernels::vectorized_row(input, filter, &params, row, out_row)
                });
            }
            Strategy::Tiled(dims) => {
                let (input, filter) = (input.as_vec4()?, filter.as_vec4()?);
                let dims = dims.clamped_to(params.height, params.width);
                let (_, group_cols) = dims.groups_for(params.height, params.width);
                for_each_partition(self, output.as_vec4_mut()?, chunk_pixels, |group_row, band| {
                    for group_col in 0..group_cols {
                        kernels::tiled_group(
                            input,
                            filter,
                            &params,
                            dims,
                            (group_row, group_col),
                            band,
                        );
                    }
                });
            }
        }

        Ok(output)
    }
}

/// Run `f(partition_index, partition)` over disjoint `chunk_len` partitions
/// of `data`, in parallel when rayon is available.
fn for_each_partition<T, F>(client: &CpuClient, data: &mut [T], chunk_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        let min_len = client.rayon_min_len();
        client.install_parallelism(|| {
            data.par_chunks_mut(chunk_len)
                .enumerate()
                .with_min_len(min_len)
                .for_each(|(i, chunk)| f(i, chunk));
        });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = client;
        data.chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(i, chunk)| f(i, chunk));
    }
}
