//! Blend modes and the profile each one selects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::accumulate::FlagColor;
use crate::metric::DiffMetric;

/// The five trail variants. The discriminant order is the selector index
/// used by the UI and the CLI (`0..=4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Per-channel running maximum of `|curr - prev|`, read pixel by pixel.
    RawMaxDiff,
    /// Same output as `RawMaxDiff`, read by direct buffer indexing.
    OptimizedMaxDiff,
    /// White where the largest channel diff exceeded the threshold.
    ThresholdMaxDiff,
    /// White where the perceptual luminance diff exceeded the threshold.
    GrayscaleThreshold,
    /// Current-frame color where the approximate luminance diff exceeded
    /// the threshold.
    #[default]
    FastApproxColorTrail,
}

/// How the max-diff modes read input pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Coordinate accessor per pixel, bounds checked on every read.
    PerPixel,
    /// Linear index over the raw buffer.
    Direct,
}

/// What the engine runs for one mode. Each family carries only the knobs
/// its modes actually vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeProfile {
    /// `canvas_c := max(canvas_c, |curr_c - prev_c|)` for every pixel;
    /// alpha forced to 255. The threshold is ignored.
    MaxDiff { access: Access },
    /// Sticky flag on a scalar metric of the RGBA pixels, direct access.
    /// Pixels identical in all four channels are skipped.
    Threshold { metric: DiffMetric, flag: FlagColor },
    /// Sticky white flag on cached BT.601 luminance planes.
    LumaThreshold,
}

impl BlendMode {
    pub const ALL: [BlendMode; 5] = [
        BlendMode::RawMaxDiff,
        BlendMode::OptimizedMaxDiff,
        BlendMode::ThresholdMaxDiff,
        BlendMode::GrayscaleThreshold,
        BlendMode::FastApproxColorTrail,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::RawMaxDiff => "raw-max-diff",
            BlendMode::OptimizedMaxDiff => "optimized-max-diff",
            BlendMode::ThresholdMaxDiff => "threshold-max-diff",
            BlendMode::GrayscaleThreshold => "grayscale-threshold",
            BlendMode::FastApproxColorTrail => "fast-approx-color-trail",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BlendMode::RawMaxDiff => "per-channel max of |diff|, per-pixel access",
            BlendMode::OptimizedMaxDiff => "per-channel max of |diff|, direct buffer access",
            BlendMode::ThresholdMaxDiff => "white where max channel diff > threshold",
            BlendMode::GrayscaleThreshold => "white where luminance diff > threshold",
            BlendMode::FastApproxColorTrail => {
                "current color where (R+G+B)/3 diff > threshold"
            }
        }
    }

    /// Whether the threshold affects the output.
    pub fn uses_threshold(self) -> bool {
        !matches!(self.profile(), ModeProfile::MaxDiff { .. })
    }

    pub fn profile(self) -> ModeProfile {
        match self {
            BlendMode::RawMaxDiff => ModeProfile::MaxDiff {
                access: Access::PerPixel,
            },
            BlendMode::OptimizedMaxDiff => ModeProfile::MaxDiff {
                access: Access::Direct,
            },
            BlendMode::ThresholdMaxDiff => ModeProfile::Threshold {
                metric: DiffMetric::MaxChannel,
                flag: FlagColor::White,
            },
            BlendMode::GrayscaleThreshold => ModeProfile::LumaThreshold,
            BlendMode::FastApproxColorTrail => ModeProfile::Threshold {
                metric: DiffMetric::ApproxLuma,
                flag: FlagColor::Current,
            },
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised mode selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blend mode '{0}' (expected 0-4 or one of: raw-max-diff, optimized-max-diff, threshold-max-diff, grayscale-threshold, fast-approx-color-trail)")]
pub struct ParseModeError(pub String);

impl FromStr for BlendMode {
    type Err = ParseModeError;

    /// Accepts the selector index (`"0"`..`"4"`) or the kebab-case name,
    /// case-insensitively; underscores are treated as dashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| ParseModeError(s.to_string()));
        }
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}
