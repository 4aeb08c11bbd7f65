//! Convolution operations for halo-padded RGBA images.
//!
//! This module defines the `ConvOps` trait and the execution [`Strategy`]
//! that selects how work-items access the padded input.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::image::Image;
use crate::runtime::Runtime;

/// Dimensions of one 2D workgroup, in work-items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkgroupDims {
    /// Work-items along the image rows (y)
    pub rows: usize,
    /// Work-items along the image columns (x)
    pub cols: usize,
}

impl WorkgroupDims {
    /// Create workgroup dimensions.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Work-items per group, saturating at `usize::MAX`.
    #[inline]
    pub fn area(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Scratchpad shape `(rows + 2*halo, cols + 2*halo)` for a given halo,
    /// saturating at `usize::MAX`.
    #[inline]
    pub fn scratchpad_dims(&self, halo: usize) -> (usize, usize) {
        let border = halo.saturating_mul(2);
        (
            self.rows.saturating_add(border),
            self.cols.saturating_add(border),
        )
    }

    /// The same grouping restricted to a `height x width` grid.
    ///
    /// A group taller or wider than the grid covers it in one group along
    /// that axis either way, so the clamped shape produces the same output
    /// with a scratchpad no larger than the padded image.
    #[inline]
    pub fn clamped_to(&self, height: usize, width: usize) -> Self {
        Self::new(self.rows.min(height.max(1)), self.cols.min(width.max(1)))
    }

    /// Number of groups needed to cover a `height x width` grid.
    #[inline]
    pub fn groups_for(&self, height: usize, width: usize) -> (usize, usize) {
        (height.div_ceil(self.rows), width.div_ceil(self.cols))
    }
}

impl Default for WorkgroupDims {
    fn default() -> Self {
        Self::new(16, 16)
    }
}

impl fmt::Display for WorkgroupDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for WorkgroupDims {
    type Err = Error;

    /// Parses `ROWSxCOLS`, e.g. `16x16` or `1x32`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::invalid_argument(
                "workgroup_dims",
                format!("expected ROWSxCOLS, got '{}'", s),
            )
        };
        let (rows, cols) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let rows = rows.trim().parse().map_err(|_| invalid())?;
        let cols = cols.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(rows, cols))
    }
}

/// How work-items read the padded input and filter.
///
/// All strategies accumulate in the same order (filter row outer, filter
/// column inner) in single precision, so they produce identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One work-item per pixel, four scalar reads and accumulations per tap.
    Naive,
    /// One work-item per pixel, one 4-wide read and multiply-accumulate per tap.
    Vectorized,
    /// Work-items grouped into 2D workgroups that stage their input region,
    /// halo included, in a shared scratchpad before computing.
    Tiled(WorkgroupDims),
}

impl Strategy {
    /// All three strategies, the tiled one using `dims`.
    pub fn all(dims: WorkgroupDims) -> [Strategy; 3] {
        [Strategy::Naive, Strategy::Vectorized, Strategy::Tiled(dims)]
    }

    /// Short name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Vectorized => "vectorized",
            Strategy::Tiled(_) => "tiled",
        }
    }

    /// Workgroup dimensions, for the tiled strategy.
    pub fn workgroup_dims(&self) -> Option<WorkgroupDims> {
        match self {
            Strategy::Tiled(dims) => Some(*dims),
            _ => None,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Tiled(WorkgroupDims::default())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Tiled(dims) => write!(f, "tiled({})", dims),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Parses `naive`, `vectorized`, `tiled` (16x16) or `tiled:ROWSxCOLS`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "naive" => Ok(Strategy::Naive),
            "vectorized" => Ok(Strategy::Vectorized),
            "tiled" => Ok(Strategy::default()),
            other => match other.strip_prefix("tiled:") {
                Some(dims) => Ok(Strategy::Tiled(dims.parse()?)),
                None => Err(Error::invalid_argument(
                    "strategy",
                    format!(
                        "unknown strategy '{}' (expected naive, vectorized or tiled[:ROWSxCOLS])",
                        other
                    ),
                )),
            },
        }
    }
}

/// Dense 2D image convolution.
///
/// # Memory Layout
///
/// - **Input**: padded RGBA image whose halo equals the filter's half width
/// - **Filter**: square RGBA image of odd width, no halo
/// - **Output**: unpadded RGBA image with the input's logical dimensions
///
/// Output pixel `(y, x)` channel `c` is
/// `sum over r, k of input.pixel(y + r, x + k)[c] * filter.pixel(r, k)[c]`,
/// with `r` the outer and `k` the inner loop.
///
/// # Errors
///
/// - `InvalidArgument` when operand shapes break the contract above
/// - `BackendLimitation` when a backend cannot run the requested workgroup size
/// - `Execution` when a dispatch fails after submission; no output is returned
pub trait ConvOps<R: Runtime> {
    /// Convolve `input` with `filter` using the given access strategy.
    fn convolve(&self, input: &Image, filter: &Image, strategy: Strategy) -> Result<Image>;
}
