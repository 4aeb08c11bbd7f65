//! 8-bit pixel buffers exchanged with the image codec.

use super::{Image, padding::pad_clamp_to_edge};
use crate::error::{Error, Result};

/// Decoded 8-bit image as handed over by an image codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImage {
    /// Row-major, channel-interleaved samples
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Samples per pixel
    pub channels: usize,
}

impl RawImage {
    /// Create a raw image, checking the buffer length.
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, channels: usize) -> Result<Self> {
        if pixels.len() != width * height * channels {
            return Err(Error::Input(format!(
                "pixel buffer of {} bytes does not match {}x{}x{}",
                pixels.len(),
                width,
                height,
                channels
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            channels,
        })
    }

    /// Convert to `f32` samples and surround with a clamp-to-edge halo.
    pub fn to_padded(&self, halo: usize) -> Result<Image> {
        pad_clamp_to_edge(&self.pixels, self.width, self.height, self.channels, halo)
    }
}
