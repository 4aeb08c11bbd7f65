//! Halo construction with clamp-to-edge boundary handling.
//!
//! The border is materialized once here so convolution work-items never
//! branch on image bounds.

use super::Image;
use crate::error::{Error, Result};

/// Build a padded image from an unpadded source.
///
/// Every stored pixel `(i, j)` of the `(width+2h) x (height+2h)` result holds
/// the source pixel at `(clamp(i-h, 0, height-1), clamp(j-h, 0, width-1))`.
pub fn pad_clamp_to_edge<T>(
    source: &[T],
    width: usize,
    height: usize,
    channels: usize,
    halo: usize,
) -> Result<Image>
where
    T: Copy + Into<f32>,
{
    if width == 0 || height == 0 || channels == 0 {
        return Err(Error::Input(format!(
            "cannot pad an empty image ({}x{}x{})",
            width, height, channels
        )));
    }
    if source.len() != width * height * channels {
        return Err(Error::Input(format!(
            "source buffer of {} samples does not match {}x{}x{}",
            source.len(),
            width,
            height,
            channels
        )));
    }

    let padded_width = width + 2 * halo;
    let padded_height = height + 2 * halo;
    let mut data = Vec::with_capacity(padded_width * padded_height * channels);

    for i in 0..padded_height {
        let src_i = clamp_coord(i, halo, height);
        for j in 0..padded_width {
            let src_j = clamp_coord(j, halo, width);
            let start = (src_i * width + src_j) * channels;
            data.extend(source[start..start + channels].iter().map(|&s| s.into()));
        }
    }

    Image::from_padded_vec(data, width, height, channels, halo)
}

/// Map a padded coordinate back to the nearest in-bounds source coordinate.
#[inline]
fn clamp_coord(padded: usize, halo: usize, len: usize) -> usize {
    padded.saturating_sub(halo).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_coord() {
        assert_eq!(clamp_coord(0, 2, 4), 0);
        assert_eq!(clamp_coord(1, 2, 4), 0);
        assert_eq!(clamp_coord(2, 2, 4), 0);
        assert_eq!(clamp_coord(5, 2, 4), 3);
        assert_eq!(clamp_coord(7, 2, 4), 3);
    }

    #[test]
    fn test_pad_single_channel() {
        // 2x2 source:
        //   1 2
        //   3 4
        let padded = pad_clamp_to_edge(&[1u8, 2, 3, 4], 2, 2, 1, 1).unwrap();
        assert_eq!(padded.padded_width(), 4);
        assert_eq!(padded.padded_height(), 4);
        #[rustfmt::skip]
        let expected = [
            1.0, 1.0, 2.0, 2.0,
            1.0, 1.0, 2.0, 2.0,
            3.0, 3.0, 4.0, 4.0,
            3.0, 3.0, 4.0, 4.0,
        ];
        assert_eq!(padded.data(), &expected);
    }

    #[test]
    fn test_pad_zero_halo_is_copy() {
        let source = [0.5f32, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5];
        let padded = pad_clamp_to_edge(&source, 2, 1, 4, 0).unwrap();
        assert_eq!(padded.data(), &source);
        assert!(!padded.is_padded());
    }

    #[test]
    fn test_pad_halo_wider_than_image() {
        let padded = pad_clamp_to_edge(&[7u8, 9], 2, 1, 1, 3).unwrap();
        assert_eq!(padded.padded_width(), 8);
        assert_eq!(padded.padded_height(), 7);
        for row in 0..7 {
            assert_eq!(padded.pixel(row, 0), &[7.0]);
            assert_eq!(padded.pixel(row, 3), &[7.0]);
            assert_eq!(padded.pixel(row, 4), &[9.0]);
            assert_eq!(padded.pixel(row, 7), &[9.0]);
        }
    }

    #[test]
    fn test_pad_rejects_empty_and_short_buffers() {
        assert!(matches!(
            pad_clamp_to_edge::<u8>(&[], 0, 3, 4, 1),
            Err(Error::Input(_))
        ));
        assert!(matches!(
            pad_clamp_to_edge(&[1u8, 2, 3], 2, 2, 1, 1),
            Err(Error::Input(_))
        ));
    }
}
