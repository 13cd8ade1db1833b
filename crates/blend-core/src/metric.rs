//! Per-pixel change metrics between two consecutive frames.

use serde::{Deserialize, Serialize};

use crate::pixel::{approx_luma, Rgba};

/// Scalar measure of change between `prev` and `curr`, compared against
/// the threshold. The max-diff modes use [`channel_abs_diff`] directly and
/// the grayscale mode diffs [`LumaPlane`](crate::pixel::LumaPlane) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffMetric {
    /// Largest of the three channel differences.
    MaxChannel,
    /// `|(R+G+B)/3 - (R'+G'+B')/3|` with integer truncation.
    ApproxLuma,
}

impl DiffMetric {
    #[inline]
    pub fn magnitude(self, prev: Rgba, curr: Rgba) -> u8 {
        match self {
            DiffMetric::MaxChannel => max_channel_diff(prev, curr),
            DiffMetric::ApproxLuma => approx_luma(curr).abs_diff(approx_luma(prev)),
        }
    }
}

/// Per-channel absolute difference of the color channels.
#[inline]
pub fn channel_abs_diff(prev: Rgba, curr: Rgba) -> [u8; 3] {
    [
        curr.r().abs_diff(prev.r()),
        curr.g().abs_diff(prev.g()),
        curr.b().abs_diff(prev.b()),
    ]
}

/// `max(|dR|, |dG|, |dB|)`. A saturated single-channel flash counts in full
/// instead of being diluted by the other channels.
#[inline]
pub fn max_channel_diff(prev: Rgba, curr: Rgba) -> u8 {
    let [r, g, b] = channel_abs_diff(prev, curr);
    r.max(g).max(b)
}
