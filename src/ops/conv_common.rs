//! Shared validation and utility functions for convolution operations.
//!
//! This module contains the validation used by every backend (CPU, WebGPU)
//! so that all of them accept and reject exactly the same operands.

use crate::error::{Error, Result};
use crate::filter::validate_filter_width;
use crate::image::{Image, RGBA_CHANNELS};
use crate::ops::{Strategy, WorkgroupDims};

/// Validated geometry of one convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvParams {
    /// Logical output width
    pub width: usize,
    /// Logical output height
    pub height: usize,
    /// Row length of the padded input, in pixels
    pub padded_width: usize,
    /// Row count of the padded input
    pub padded_height: usize,
    /// Filter width (odd)
    pub filter_width: usize,
    /// Filter half width, equal to the input halo
    pub halo: usize,
}

impl ConvParams {
    /// Output pixel count.
    #[inline]
    pub fn output_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Padded input pixel count.
    #[inline]
    pub fn input_pixels(&self) -> usize {
        self.padded_width * self.padded_height
    }

    /// Filter tap count.
    #[inline]
    pub fn taps(&self) -> usize {
        self.filter_width * self.filter_width
    }
}

/// Validates that an image has exactly 4 (RGBA) channels.
#[inline]
pub fn validate_rgba(image: &Image, arg_name: &'static str) -> Result<()> {
    if image.channels() != RGBA_CHANNELS {
        return Err(Error::invalid_argument(
            arg_name,
            format!(
                "convolve expects {} channels, got {}",
                RGBA_CHANNELS,
                image.channels()
            ),
        ));
    }
    Ok(())
}

/// Validates a filter operand: square, odd width, RGBA, no halo.
pub fn validate_filter(filter: &Image) -> Result<()> {
    validate_rgba(filter, "filter")?;
    if filter.width() != filter.height() {
        return Err(Error::invalid_argument(
            "filter",
            format!(
                "filter must be square, got {}x{}",
                filter.width(),
                filter.height()
            ),
        ));
    }
    if filter.is_padded() {
        return Err(Error::invalid_argument("filter", "filter must not carry a halo"));
    }
    validate_filter_width(filter.width())
}

/// Validates workgroup dimensions for the tiled strategy.
///
/// Any non-zero shape is accepted as long as its work-item count and its
/// scratchpad for `halo` are addressable.
pub fn validate_workgroup(dims: WorkgroupDims, halo: usize) -> Result<()> {
    if dims.rows == 0 || dims.cols == 0 {
        return Err(Error::invalid_argument(
            "workgroup_dims",
            format!("workgroup dimensions must be > 0, got {}", dims),
        ));
    }
    let scratchpad = halo
        .checked_mul(2)
        .and_then(|border| Some((dims.rows.checked_add(border)?, dims.cols.checked_add(border)?)))
        .and_then(|(rows, cols)| rows.checked_mul(cols));
    if dims.rows.checked_mul(dims.cols).is_none() || scratchpad.is_none() {
        return Err(Error::invalid_argument(
            "workgroup_dims",
            format!("workgroup {} with halo {} is not addressable", dims, halo),
        ));
    }
    Ok(())
}

/// Validate operands of a convolution and compute its geometry.
pub fn validate_convolve(input: &Image, filter: &Image, strategy: Strategy) -> Result<ConvParams> {
    validate_filter(filter)?;
    validate_rgba(input, "input")?;

    if input.width() == 0 || input.height() == 0 {
        return Err(Error::invalid_argument(
            "input",
            format!("empty image {}x{}", input.width(), input.height()),
        ));
    }

    let halo = filter.half_width();
    if input.halo() != halo {
        return Err(Error::invalid_argument(
            "input",
            format!(
                "input halo {} does not match filter half width {} (filter width {})",
                input.halo(),
                halo,
                filter.width()
            ),
        ));
    }

    if let Strategy::Tiled(dims) = strategy {
        validate_workgroup(dims, halo)?;
    }

    Ok(ConvParams {
        width: input.width(),
        height: input.height(),
        padded_width: input.padded_width(),
        padded_height: input.padded_height(),
        filter_width: filter.width(),
        halo,
    })
}
