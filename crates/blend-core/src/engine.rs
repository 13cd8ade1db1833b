//! The blend engine: drives the pairwise diff loop over a frame sequence.
//!
//! Every invocation is synchronous and self-contained. The canvas is sized
//! to the first frame and starts opaque black; each consecutive pair
//! `(i - 1, i)` is diffed and folded into it according to the mode's
//! [`ModeProfile`]. Bad input never errors: it yields the degenerate value
//! (no canvas, or the black canvas) together with a [`BlendStatus`] saying
//! why.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::accumulate::{channel_max, sticky, FlagColor};
use crate::frame::Frame;
use crate::metric::{channel_abs_diff, DiffMetric};
use crate::mode::{Access, BlendMode, ModeProfile};
use crate::pixel::{LumaPlane, Rgba};
use crate::threshold::Threshold;

/// Parameters for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    pub mode: BlendMode,
    /// Ignored by modes that do not threshold.
    pub threshold: Threshold,
    /// Refuse sequences whose [`BlendCost::pixel_ops`] exceeds this.
    pub pixel_budget: Option<u64>,
}

/// Work a blend would do, known before running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlendCost {
    /// Consecutive pairs compared.
    pub pairs: usize,
    pub pixels_per_pair: u64,
    /// `pairs * pixels_per_pair`.
    pub pixel_ops: u64,
}

impl BlendCost {
    pub fn of(frames: &[Frame]) -> Self {
        let pairs = frames.len().saturating_sub(1);
        let pixels_per_pair = frames.first().map_or(0, |f| f.pixel_count() as u64);
        Self {
            pairs,
            pixels_per_pair,
            pixel_ops: pixels_per_pair.saturating_mul(pairs as u64),
        }
    }
}

/// Why a blend produced what it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlendStatus {
    /// No frames; no canvas allocated.
    Empty,
    /// One frame, no pair to diff; canvas is black.
    SingleFrame,
    /// Frame `index` differs in size from frame 0; canvas is black.
    DimensionMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// The sequence is larger than the configured budget; canvas is black.
    BudgetExceeded { pixel_ops: u64, budget: u64 },
    /// Every pair was processed.
    Completed,
}

/// Which pixel positions were ever marked as changed.
///
/// For threshold modes this is the sticky flag set; for the max-diff modes
/// it is every position whose accumulated output is not black.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl ChangeMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Flagged `(x, y)` positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width.max(1) as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(idx, _)| ((idx % width) as u32, (idx / width) as u32))
    }

    /// True when every position flagged here is also flagged in `other`.
    pub fn is_subset_of(&self, other: &ChangeMask) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .bits
                .iter()
                .zip(&other.bits)
                .all(|(mine, theirs)| !*mine || *theirs)
    }

    fn set(&mut self, idx: usize) {
        self.bits[idx] = true;
    }
}

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendOutcome {
    /// The trail. `None` only for an empty sequence.
    pub frame: Option<Frame>,
    pub status: BlendStatus,
    pub pairs_processed: usize,
    pub mask: ChangeMask,
}

impl BlendOutcome {
    fn empty() -> Self {
        Self {
            frame: None,
            status: BlendStatus::Empty,
            pairs_processed: 0,
            mask: ChangeMask::default(),
        }
    }

    fn degenerate(canvas: Frame, status: BlendStatus) -> Self {
        let (width, height) = canvas.dimensions();
        Self {
            frame: Some(canvas),
            status,
            pairs_processed: 0,
            mask: ChangeMask::new(width, height),
        }
    }

    /// Whether every consecutive pair was blended.
    pub fn is_complete(&self) -> bool {
        matches!(
            self.status,
            BlendStatus::Completed | BlendStatus::SingleFrame
        )
    }

    pub fn flagged_pixels(&self) -> usize {
        self.mask.count()
    }

    pub fn into_frame(self) -> Option<Frame> {
        self.frame
    }
}

/// Difference-accumulation engine for a fixed mode and threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlendEngine {
    config: BlendConfig,
}

impl BlendEngine {
    pub fn new(config: BlendConfig) -> Self {
        Self { config }
    }

    pub fn with_mode(mode: BlendMode, threshold: Threshold) -> Self {
        Self::new(BlendConfig {
            mode,
            threshold,
            pixel_budget: None,
        })
    }

    pub fn config(&self) -> &BlendConfig {
        &self.config
    }

    /// Blend the sequence into a single trail frame.
    ///
    /// Blocks for `O(frames * width * height)`; see [`BlendCost::of`].
    pub fn blend(&self, frames: &[Frame]) -> BlendOutcome {
        let Some(first) = frames.first() else {
            tracing::debug!(mode = %self.config.mode, "Blend skipped: no frames");
            return BlendOutcome::empty();
        };

        let started = Instant::now();
        let (width, height) = first.dimensions();
        let canvas = Frame::filled(width, height, Rgba::BLACK);

        let mismatch = frames
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, frame)| frame.dimensions() != (width, height));
        if let Some((index, frame)) = mismatch {
            tracing::warn!(
                "Frame sizes don't match: frame {} is {}x{}, expected {}x{}",
                index,
                frame.width(),
                frame.height(),
                width,
                height
            );
            return BlendOutcome::degenerate(
                canvas,
                BlendStatus::DimensionMismatch {
                    index,
                    expected: (width, height),
                    found: frame.dimensions(),
                },
            );
        }

        if frames.len() == 1 {
            return BlendOutcome::degenerate(canvas, BlendStatus::SingleFrame);
        }

        let cost = BlendCost::of(frames);
        if let Some(budget) = self.config.pixel_budget {
            if cost.pixel_ops > budget {
                tracing::warn!(
                    pixel_ops = cost.pixel_ops,
                    budget,
                    "Blend refused: sequence exceeds pixel budget"
                );
                return BlendOutcome::degenerate(
                    canvas,
                    BlendStatus::BudgetExceeded {
                        pixel_ops: cost.pixel_ops,
                        budget,
                    },
                );
            }
        }

        let mut canvas = canvas;
        let mut mask = ChangeMask::new(width, height);
        match self.config.mode.profile() {
            ModeProfile::MaxDiff {
                access: Access::PerPixel,
            } => max_diff_per_pixel(frames, &mut canvas, &mut mask),
            ModeProfile::MaxDiff {
                access: Access::Direct,
            } => max_diff_direct(frames, &mut canvas, &mut mask),
            ModeProfile::Threshold { metric, flag } => {
                self.threshold_direct(metric, flag, frames, &mut canvas, &mut mask)
            }
            ModeProfile::LumaThreshold => self.threshold_luma(frames, &mut canvas, &mut mask),
        }

        let outcome = BlendOutcome {
            frame: Some(canvas),
            status: BlendStatus::Completed,
            pairs_processed: cost.pairs,
            mask,
        };
        tracing::debug!(
            mode = %self.config.mode,
            frames = frames.len(),
            width,
            height,
            flagged = outcome.flagged_pixels(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Blend complete"
        );
        outcome
    }

    fn threshold_direct(
        &self,
        metric: DiffMetric,
        flag: FlagColor,
        frames: &[Frame],
        canvas: &mut Frame,
        mask: &mut ChangeMask,
    ) {
        let pixels = canvas.pixel_count();
        let threshold = self.config.threshold;
        for pair in frames.windows(2) {
            let prev = pair[0].view();
            let curr = pair[1].view();
            let mut out = canvas.view_mut();
            for idx in 0..pixels {
                // SAFETY: `blend` verified every frame has the canvas
                // dimensions, so idx < len for all three views.
                let (p, c) = unsafe { (prev.get_unchecked(idx), curr.get_unchecked(idx)) };
                if p == c {
                    continue;
                }
                if let Some(px) = sticky(flag, metric.magnitude(p, c), threshold, c) {
                    // SAFETY: as above.
                    unsafe { out.set_unchecked(idx, px) };
                    mask.set(idx);
                }
            }
        }
    }

    /// Grayscale path. Each frame is converted once; the plane of frame `i`
    /// is reused as `prev` for pair `(i, i + 1)`.
    fn threshold_luma(&self, frames: &[Frame], canvas: &mut Frame, mask: &mut ChangeMask) {
        let pixels = canvas.pixel_count();
        let threshold = self.config.threshold;
        let mut prev_luma = LumaPlane::from_frame(&frames[0]);
        for curr_frame in &frames[1..] {
            let curr_luma = LumaPlane::from_frame(curr_frame);
            let mut out = canvas.view_mut();
            for idx in 0..pixels {
                // SAFETY: planes are built from frames with the canvas
                // dimensions, so idx < len.
                let (p, c) = unsafe { (prev_luma.get_unchecked(idx), curr_luma.get_unchecked(idx)) };
                if p == c {
                    continue;
                }
                if threshold.exceeded_by(p.abs_diff(c)) {
                    // SAFETY: as above.
                    unsafe { out.set_unchecked(idx, Rgba::WHITE) };
                    mask.set(idx);
                }
            }
            prev_luma = curr_luma;
        }
    }
}

fn max_diff_per_pixel(frames: &[Frame], canvas: &mut Frame, mask: &mut ChangeMask) {
    let (width, height) = canvas.dimensions();
    for pair in frames.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        for y in 0..height {
            for x in 0..width {
                let diff = channel_abs_diff(prev.pixel(x, y), curr.pixel(x, y));
                let out = channel_max(canvas.pixel(x, y), diff);
                canvas.put_pixel(x, y, out);
                if !out.is_black() {
                    mask.set(y as usize * width as usize + x as usize);
                }
            }
        }
    }
}

fn max_diff_direct(frames: &[Frame], canvas: &mut Frame, mask: &mut ChangeMask) {
    let pixels = canvas.pixel_count();
    for pair in frames.windows(2) {
        let prev = pair[0].view();
        let curr = pair[1].view();
        let mut out = canvas.view_mut();
        for idx in 0..pixels {
            // SAFETY: `blend` verified every frame has the canvas dimensions.
            let (p, c, acc) = unsafe {
                (
                    prev.get_unchecked(idx),
                    curr.get_unchecked(idx),
                    out.get_unchecked(idx),
                )
            };
            let px = channel_max(acc, channel_abs_diff(p, c));
            // SAFETY: as above.
            unsafe { out.set_unchecked(idx, px) };
            if !px.is_black() {
                mask.set(idx);
            }
        }
    }
}

/// Blend `frames` with `mode` and return just the trail frame.
pub fn blend(frames: &[Frame], mode: BlendMode, threshold: Threshold) -> Option<Frame> {
    BlendEngine::with_mode(mode, threshold)
        .blend(frames)
        .into_frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, v: u8) -> Frame {
        Frame::filled(w, h, Rgba::opaque(v, v, v))
    }

    #[test]
    fn empty_sequence_allocates_nothing() {
        for mode in BlendMode::ALL {
            let outcome = BlendEngine::with_mode(mode, Threshold::DEFAULT).blend(&[]);
            assert_eq!(outcome.status, BlendStatus::Empty);
            assert!(outcome.frame.is_none());
        }
    }

    #[test]
    fn mismatch_reports_offending_index() {
        let frames = vec![solid(4, 4, 0), solid(4, 4, 200), solid(3, 4, 0)];
        let outcome = BlendEngine::with_mode(BlendMode::RawMaxDiff, Threshold::DEFAULT)
            .blend(&frames);
        assert_eq!(
            outcome.status,
            BlendStatus::DimensionMismatch {
                index: 2,
                expected: (4, 4),
                found: (3, 4),
            }
        );
        let frame = outcome.frame.unwrap();
        assert_eq!(frame, Frame::filled(4, 4, Rgba::BLACK));
        assert_eq!(outcome.pairs_processed, 0);
    }

    #[test]
    fn mismatch_is_checked_for_every_mode() {
        let frames = vec![solid(2, 2, 0), solid(2, 3, 255)];
        for mode in BlendMode::ALL {
            let outcome = BlendEngine::with_mode(mode, Threshold::new(0)).blend(&frames);
            assert!(
                matches!(outcome.status, BlendStatus::DimensionMismatch { .. }),
                "{mode}"
            );
        }
    }

    #[test]
    fn budget_guard_refuses_large_sequences() {
        let frames = vec![solid(10, 10, 0), solid(10, 10, 255), solid(10, 10, 0)];
        let engine = BlendEngine::new(BlendConfig {
            mode: BlendMode::ThresholdMaxDiff,
            threshold: Threshold::new(1),
            pixel_budget: Some(199),
        });
        let outcome = engine.blend(&frames);
        assert_eq!(
            outcome.status,
            BlendStatus::BudgetExceeded {
                pixel_ops: 200,
                budget: 199,
            }
        );
        assert_eq!(outcome.flagged_pixels(), 0);

        let engine = BlendEngine::new(BlendConfig {
            pixel_budget: Some(200),
            ..*engine.config()
        });
        assert_eq!(engine.blend(&frames).status, BlendStatus::Completed);
    }

    #[test]
    fn cost_counts_pairs() {
        let frames = vec![solid(3, 2, 0); 4];
        let cost = BlendCost::of(&frames);
        assert_eq!(cost.pairs, 3);
        assert_eq!(cost.pixels_per_pair, 6);
        assert_eq!(cost.pixel_ops, 18);
        assert_eq!(BlendCost::of(&[]).pixel_ops, 0);
    }

    #[test]
    fn max_diff_keeps_peak_per_channel() {
        let frames = vec![
            Frame::filled(1, 1, Rgba::opaque(0, 0, 0)),
            Frame::filled(1, 1, Rgba::opaque(100, 10, 0)),
            Frame::filled(1, 1, Rgba::opaque(60, 90, 5)),
        ];
        for mode in [BlendMode::RawMaxDiff, BlendMode::OptimizedMaxDiff] {
            let frame = blend(&frames, mode, Threshold::DEFAULT).unwrap();
            assert_eq!(frame.pixel(0, 0), Rgba::opaque(100, 80, 5), "{mode}");
        }
    }

    #[test]
    fn grayscale_ignores_luma_neutral_change() {
        // Same BT.601 luma, different hue.
        let a = Rgba::opaque(100, 100, 100);
        let b = Rgba::opaque(125, 87, 100);
        assert_eq!(
            crate::pixel::perceptual_luma(a),
            crate::pixel::perceptual_luma(b)
        );
        let frames = vec![Frame::filled(2, 2, a), Frame::filled(2, 2, b)];
        let outcome =
            BlendEngine::with_mode(BlendMode::GrayscaleThreshold, Threshold::new(0)).blend(&frames);
        assert_eq!(outcome.flagged_pixels(), 0);

        let outcome =
            BlendEngine::with_mode(BlendMode::ThresholdMaxDiff, Threshold::new(0)).blend(&frames);
        assert_eq!(outcome.flagged_pixels(), 4);
    }

    #[test]
    fn color_trail_flag_survives_black_write() {
        let frames = vec![
            Frame::filled(1, 1, Rgba::WHITE),
            Frame::filled(1, 1, Rgba::BLACK),
        ];
        let outcome = BlendEngine::with_mode(BlendMode::FastApproxColorTrail, Threshold::new(10))
            .blend(&frames);
        assert_eq!(outcome.frame.as_ref().unwrap().pixel(0, 0), Rgba::BLACK);
        assert!(outcome.mask.contains(0, 0));
    }

    #[test]
    fn mask_positions_are_row_major() {
        let mut mask = ChangeMask::new(3, 2);
        mask.set(1);
        mask.set(5);
        assert_eq!(mask.positions().collect::<Vec<_>>(), vec![(1, 0), (2, 1)]);
        assert!(mask.contains(2, 1));
        assert!(!mask.contains(3, 1));
    }
}
