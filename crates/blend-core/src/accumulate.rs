//! Accumulation policies: how a per-pair diff folds into the output canvas.

use serde::{Deserialize, Serialize};

use crate::pixel::Rgba;
use crate::threshold::Threshold;

/// Color written when a sticky flag fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagColor {
    /// Solid opaque white, giving a binary mask.
    White,
    /// The current frame's pixel, alpha included, giving a colored trail.
    Current,
}

/// Fold a per-channel diff into the canvas pixel; alpha forced to 255.
#[inline]
pub fn channel_max(canvas: Rgba, diff: [u8; 3]) -> Rgba {
    Rgba::opaque(
        canvas.r().max(diff[0]),
        canvas.g().max(diff[1]),
        canvas.b().max(diff[2]),
    )
}

/// Decide the sticky write for one pixel. `None` leaves the canvas as is;
/// nothing ever clears a written pixel.
#[inline]
pub fn sticky(flag: FlagColor, magnitude: u8, threshold: Threshold, curr: Rgba) -> Option<Rgba> {
    if !threshold.exceeded_by(magnitude) {
        return None;
    }
    Some(match flag {
        FlagColor::White => Rgba::WHITE,
        FlagColor::Current => curr,
    })
}
