//! Image buffers.
//!
//! [`Image`] is the single owning sample buffer used for inputs, filters and
//! outputs. Samples are `f32`, row-major, channel-interleaved, with an optional
//! halo of replicated border pixels around the logical image.
//!
//! ```text
//! padded storage (halo = 1, logical 3x2):
//!
//!   h h h h h
//!   h p p p h      p = logical pixel
//!   h p p p h      h = halo pixel (clamp-to-edge copy of nearest p)
//!   h h h h h
//! ```

mod padding;
mod raw;

pub use padding::pad_clamp_to_edge;
pub use raw::RawImage;

use crate::error::{Error, Result};

/// Number of channels every convolution operand carries (RGBA).
pub const RGBA_CHANNELS: usize = 4;

/// One RGBA pixel reinterpreted as a 4-wide vector.
pub type Vec4 = [f32; RGBA_CHANNELS];

/// Owning image buffer.
///
/// The buffer length always equals
/// `(width + 2*halo) * (height + 2*halo) * channels`; `width` and `height`
/// are the logical (unpadded) dimensions. Storage is released when the value
/// is dropped.
#[derive(Clone, PartialEq)]
pub struct Image {
    data: Vec<f32>,
    width: usize,
    height: usize,
    channels: usize,
    halo: usize,
}

impl Image {
    /// Create a zero-filled unpadded image.
    pub fn zeros(width: usize, height: usize, channels: usize) -> Self {
        Self::filled(width, height, channels, 0.0)
    }

    /// Create an unpadded image with every sample set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: f32) -> Self {
        Self {
            data: vec![value; width * height * channels],
            width,
            height,
            channels,
            halo: 0,
        }
    }

    /// Wrap an unpadded sample buffer.
    pub fn from_vec(data: Vec<f32>, width: usize, height: usize, channels: usize) -> Result<Self> {
        Self::from_padded_vec(data, width, height, channels, 0)
    }

    /// Wrap a sample buffer that already carries a halo of `halo` pixels.
    pub fn from_padded_vec(
        data: Vec<f32>,
        width: usize,
        height: usize,
        channels: usize,
        halo: usize,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(Error::invalid_argument("channels", "must be > 0"));
        }
        let expected = (width + 2 * halo) * (height + 2 * halo) * channels;
        if data.len() != expected {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "buffer of {} samples does not match {}x{}x{} with halo {} ({} samples)",
                    data.len(),
                    width,
                    height,
                    channels,
                    halo,
                    expected
                ),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            halo,
        })
    }

    /// Logical width in pixels (halo excluded).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Logical height in pixels (halo excluded).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Border thickness in pixels; 0 for unpadded images.
    #[inline]
    pub fn halo(&self) -> usize {
        self.halo
    }

    /// Logical pixel count, `width * height`.
    #[inline]
    pub fn count(&self) -> usize {
        self.width * self.height
    }

    /// Logical sample count, `width * height * channels`.
    #[inline]
    pub fn size(&self) -> usize {
        self.count() * self.channels
    }

    /// Half of the width, the tap radius when this image is a filter.
    #[inline]
    pub fn half_width(&self) -> usize {
        self.width / 2
    }

    /// Width of the stored grid, `width + 2*halo`.
    #[inline]
    pub fn padded_width(&self) -> usize {
        self.width + 2 * self.halo
    }

    /// Height of the stored grid, `height + 2*halo`.
    #[inline]
    pub fn padded_height(&self) -> usize {
        self.height + 2 * self.halo
    }

    /// Whether the image carries a halo.
    #[inline]
    pub fn is_padded(&self) -> bool {
        self.halo > 0
    }

    /// Raw samples, including the halo.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw samples, including the halo.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the image and return its sample buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Samples of the pixel at `(row, col)` of the stored grid.
    ///
    /// Coordinates address the padded grid, so `(halo, halo)` is the first
    /// logical pixel.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates fall outside the stored grid.
    pub fn pixel(&self, row: usize, col: usize) -> &[f32] {
        let start = (row * self.padded_width() + col) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Samples of the logical pixel at `(row, col)`, skipping the halo.
    pub fn logical_pixel(&self, row: usize, col: usize) -> &[f32] {
        self.pixel(row + self.halo, col + self.halo)
    }

    /// Reinterpret the samples as one 4-wide vector per pixel.
    ///
    /// Requires exactly [`RGBA_CHANNELS`] channels.
    pub fn as_vec4(&self) -> Result<&[Vec4]> {
        self.check_vec4()?;
        Ok(bytemuck::cast_slice(&self.data))
    }

    /// Mutable variant of [`Image::as_vec4`].
    pub fn as_vec4_mut(&mut self) -> Result<&mut [Vec4]> {
        self.check_vec4()?;
        Ok(bytemuck::cast_slice_mut(&mut self.data))
    }

    fn check_vec4(&self) -> Result<()> {
        if self.channels != RGBA_CHANNELS {
            return Err(Error::invalid_argument(
                "channels",
                format!(
                    "vector reinterpretation requires {} channels, got {}",
                    RGBA_CHANNELS, self.channels
                ),
            ));
        }
        Ok(())
    }

    /// Produce a copy of this (unpadded) image surrounded by a clamp-to-edge
    /// halo of `halo` pixels.
    pub fn padded(&self, halo: usize) -> Result<Image> {
        if self.is_padded() {
            return Err(Error::invalid_argument(
                "image",
                format!("already padded with halo {}", self.halo),
            ));
        }
        pad_clamp_to_edge(&self.data, self.width, self.height, self.channels, halo)
    }

    /// Copy of the logical region without the halo.
    pub fn unpadded(&self) -> Image {
        if self.halo == 0 {
            return self.clone();
        }
        let row_len = self.width * self.channels;
        let mut data = Vec::with_capacity(self.size());
        for row in 0..self.height {
            let start = ((row + self.halo) * self.padded_width() + self.halo) * self.channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Image {
            data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            halo: 0,
        }
    }

    /// Quantize the logical region to 8-bit samples for encoding.
    ///
    /// Samples are rounded to nearest and saturated to `0..=255`; NaN maps to 0.
    pub fn to_rgba8(&self) -> RawImage {
        let logical = self.unpadded();
        let pixels = logical
            .data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        RawImage {
            pixels,
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("halo", &self.halo)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_dimensions() {
        let image = Image::zeros(5, 3, 4);
        assert_eq!(image.count(), 15);
        assert_eq!(image.size(), 60);
        assert_eq!(image.data().len(), 60);
        assert_eq!(image.half_width(), 2);
        assert!(!image.is_padded());
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Image::from_vec(vec![0.0; 7], 2, 2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "data", .. }));
        assert!(Image::from_padded_vec(vec![0.0; 16 * 4], 2, 2, 4, 1).is_ok());
    }

    #[test]
    fn test_as_vec4_requires_rgba() {
        let rgba = Image::filled(2, 2, 4, 1.5);
        let vecs = rgba.as_vec4().unwrap();
        assert_eq!(vecs.len(), 4);
        assert_eq!(vecs[3], [1.5; 4]);

        let rgb = Image::zeros(2, 2, 3);
        assert!(rgb.as_vec4().is_err());
    }

    #[test]
    fn test_unpadded_strips_halo() {
        let source: Vec<f32> = (0..2 * 3 * 4).map(|v| v as f32).collect();
        let image = Image::from_vec(source.clone(), 3, 2, 4).unwrap();
        let padded = image.padded(2).unwrap();
        assert_eq!(padded.halo(), 2);
        assert_eq!(padded.unpadded().data(), &source[..]);
    }

    #[test]
    fn test_to_rgba8_rounds_and_saturates() {
        let image = Image::from_vec(vec![-3.0, 99.6, 300.0, f32::NAN], 1, 1, 4).unwrap();
        let raw = image.to_rgba8();
        assert_eq!(raw.pixels, vec![0, 100, 255, 0]);
    }
}
