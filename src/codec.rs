//! Image file codec.
//!
//! Decoding always yields 8-bit RGBA, whatever the file stores.

use std::path::Path;

use ::image::{ImageBuffer, ImageFormat, Rgba};

use crate::error::{Error, Result};
use crate::image::{RGBA_CHANNELS, RawImage};

/// Reads and writes 8-bit RGBA images.
pub trait ImageCodec {
    /// Decode the file at `path` to 4-channel 8-bit pixels.
    ///
    /// Unreadable or undecodable files are `Error::Input`.
    fn decode(&self, path: &Path) -> Result<RawImage>;

    /// Encode `image` to `path`.
    ///
    /// Fails with `Error::Output` if the image is not RGBA or the file
    /// cannot be written.
    fn encode(&self, image: &RawImage, path: &Path) -> Result<()>;
}

/// PNG codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, path: &Path) -> Result<RawImage> {
        let decoded = ::image::open(path)
            .map_err(|e| Error::Input(format!("failed to decode {}: {e}", path.display())))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        log::debug!("decoded {} ({}x{})", path.display(), width, height);
        RawImage::new(
            decoded.into_raw(),
            width as usize,
            height as usize,
            RGBA_CHANNELS,
        )
    }

    fn encode(&self, image: &RawImage, path: &Path) -> Result<()> {
        if image.channels != RGBA_CHANNELS {
            return Err(Error::Output(format!(
                "PNG encoding expects {} channels, got {}",
                RGBA_CHANNELS, image.channels
            )));
        }
        let dimension = |value: usize| {
            u32::try_from(value)
                .map_err(|_| Error::Output(format!("dimension {value} exceeds u32")))
        };
        let buffer = ImageBuffer::<Rgba<u8>, _>::from_raw(
            dimension(image.width)?,
            dimension(image.height)?,
            image.pixels.as_slice(),
        )
        .ok_or_else(|| Error::Output("pixel buffer does not match dimensions".into()))?;

        buffer
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| Error::Output(format!("failed to write {}: {e}", path.display())))
    }
}
