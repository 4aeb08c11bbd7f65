//! Filter kernel generation.
//!
//! A filter is a square [`Image`] with 4 channels and no halo. Each channel
//! plane holds independent weights; the built-in families leave the alpha
//! plane as a unit impulse so alpha passes through unchanged.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::image::{Image, RGBA_CHANNELS};

/// Closed set of filter generation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterFamily {
    /// Unit impulse at the center tap.
    Identity,
    /// Uniform box blur, `1 / (width*width)` on every tap.
    #[default]
    Blur,
    /// High-pass edge detector: center `width*width - 1`, all other taps `-1`.
    Edge,
}

impl FilterFamily {
    /// Every family, in declaration order.
    pub const ALL: [FilterFamily; 3] = [
        FilterFamily::Identity,
        FilterFamily::Blur,
        FilterFamily::Edge,
    ];

    /// Lower-case name used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            FilterFamily::Identity => "identity",
            FilterFamily::Blur => "blur",
            FilterFamily::Edge => "edge",
        }
    }

    /// Weight of the color channels at one tap.
    #[inline]
    fn color_weight(self, is_center: bool, taps: usize) -> f32 {
        match self {
            FilterFamily::Identity => unit_impulse(is_center),
            FilterFamily::Blur => 1.0 / taps as f32,
            FilterFamily::Edge => {
                if is_center {
                    (taps - 1) as f32
                } else {
                    -1.0
                }
            }
        }
    }
}

#[inline]
fn unit_impulse(is_center: bool) -> f32 {
    if is_center { 1.0 } else { 0.0 }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(FilterFamily::Identity),
            "blur" => Ok(FilterFamily::Blur),
            "edge" => Ok(FilterFamily::Edge),
            other => Err(Error::invalid_argument(
                "filter_family",
                format!("unknown filter '{}' (expected identity, blur or edge)", other),
            )),
        }
    }
}

/// Check that a filter width is a positive odd integer.
pub fn validate_filter_width(width: usize) -> Result<()> {
    if width == 0 || width % 2 == 0 {
        return Err(Error::invalid_argument(
            "filter_width",
            format!("must be a positive odd integer, got {}", width),
        ));
    }
    Ok(())
}

/// Generate a `width x width` RGBA filter of the given family.
///
/// Even widths have no center tap and are rejected.
pub fn generate_filter(family: FilterFamily, width: usize) -> Result<Image> {
    validate_filter_width(width)?;

    let taps = width * width;
    let center = width / 2;
    let mut data = Vec::with_capacity(taps * RGBA_CHANNELS);

    for r in 0..width {
        for k in 0..width {
            let is_center = r == center && k == center;
            let color = family.color_weight(is_center, taps);
            data.extend_from_slice(&[color, color, color, unit_impulse(is_center)]);
        }
    }

    Image::from_vec(data, width, width, RGBA_CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_sum(filter: &Image, channel: usize) -> f32 {
        filter
            .data()
            .chunks_exact(RGBA_CHANNELS)
            .map(|px| px[channel])
            .sum()
    }

    #[test]
    fn test_rejects_even_and_zero_width() {
        for width in [0, 2, 4, 10] {
            let err = generate_filter(FilterFamily::Blur, width).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidArgument {
                    arg: "filter_width",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_identity_filter() {
        let filter = generate_filter(FilterFamily::Identity, 5).unwrap();
        assert_eq!(filter.width(), 5);
        assert_eq!(filter.height(), 5);
        assert_eq!(filter.channels(), 4);
        assert_eq!(filter.halo(), 0);
        assert_eq!(filter.pixel(2, 2), &[1.0, 1.0, 1.0, 1.0]);
        for c in 0..4 {
            assert_eq!(channel_sum(&filter, c), 1.0);
        }
    }

    #[test]
    fn test_blur_filter_normalized() {
        for width in [1, 3, 5, 11] {
            let filter = generate_filter(FilterFamily::Blur, width).unwrap();
            for c in 0..3 {
                assert!((channel_sum(&filter, c) - 1.0).abs() < 1e-5);
            }
            // alpha is a unit impulse
            assert_eq!(channel_sum(&filter, 3), 1.0);
            assert_eq!(filter.pixel(width / 2, width / 2)[3], 1.0);
        }
    }

    #[test]
    fn test_edge_filter_sums_to_zero() {
        let filter = generate_filter(FilterFamily::Edge, 3).unwrap();
        assert_eq!(filter.pixel(1, 1), &[8.0, 8.0, 8.0, 1.0]);
        assert_eq!(filter.pixel(0, 0), &[-1.0, -1.0, -1.0, 0.0]);
        for c in 0..3 {
            assert_eq!(channel_sum(&filter, c), 0.0);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        for family in FilterFamily::ALL {
            let a = generate_filter(family, 7).unwrap();
            let b = generate_filter(family, 7).unwrap();
            let a_bits: Vec<u32> = a.data().iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u32> = b.data().iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn test_family_parse_roundtrip() {
        for family in FilterFamily::ALL {
            assert_eq!(family.to_string().parse::<FilterFamily>().unwrap(), family);
        }
        assert_eq!(" Blur ".parse::<FilterFamily>().unwrap(), FilterFamily::Blur);
        assert!("sharpen".parse::<FilterFamily>().is_err());
    }
}
