//! Live trail: buffer captured frames and recompute the trail at a bounded rate.

use difftrail_blend::{BlendEngine, BlendOutcome, Frame};
use difftrail_common::pacing::{RateController, Stopwatch};

use crate::buffer::FrameBuffer;

/// Keeps a rolling [`FrameBuffer`] and re-blends it at most `recompute_hz`
/// times per second as frames arrive.
#[derive(Debug)]
pub struct LiveTrail {
    buffer: FrameBuffer,
    engine: BlendEngine,
    pacing: RateController,
    clock: Stopwatch,
    latest: Option<BlendOutcome>,
    recomputes: u64,
}

impl LiveTrail {
    pub fn new(engine: BlendEngine, capacity: usize, recompute_hz: u32) -> Self {
        Self {
            buffer: FrameBuffer::new(capacity),
            engine,
            pacing: RateController::new(recompute_hz),
            clock: Stopwatch::start(),
            latest: None,
            recomputes: 0,
        }
    }

    /// Buffer a frame; returns the new trail if a recompute was due.
    pub fn on_frame(&mut self, frame: Frame) -> Option<&BlendOutcome> {
        let now_ms = self.clock.elapsed_ms();
        self.on_frame_at(frame, now_ms)
    }

    /// Same as [`on_frame`](Self::on_frame) with an explicit timestamp in
    /// milliseconds.
    pub fn on_frame_at(&mut self, frame: Frame, now_ms: u64) -> Option<&BlendOutcome> {
        self.buffer.push(frame);
        if !self.pacing.should_tick(now_ms) {
            return None;
        }
        Some(self.recompute())
    }

    /// Blend the buffer now, regardless of pacing.
    pub fn recompute(&mut self) -> &BlendOutcome {
        let outcome = self.buffer.recompute(&self.engine);
        self.recomputes += 1;
        tracing::debug!(
            frames = self.buffer.len(),
            flagged = outcome.flagged_pixels(),
            "Live trail recomputed"
        );
        self.latest.insert(outcome)
    }

    /// Most recent trail, if any recompute has run.
    pub fn latest(&self) -> Option<&BlendOutcome> {
        self.latest.as_ref()
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Final recompute over whatever is buffered, consuming the trail.
    pub fn finish(mut self) -> BlendOutcome {
        self.buffer.recompute(&self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use difftrail_blend::{BlendMode, BlendStatus, Rgba, Threshold};

    fn engine() -> BlendEngine {
        BlendEngine::with_mode(BlendMode::FastApproxColorTrail, Threshold::new(10))
    }

    #[test]
    fn recompute_is_rate_limited() {
        let mut live = LiveTrail::new(engine(), 10, 4);
        assert!(live.on_frame_at(Frame::filled(2, 2, Rgba::BLACK), 0).is_some());
        assert!(live.on_frame_at(Frame::filled(2, 2, Rgba::WHITE), 16).is_none());
        assert!(live.on_frame_at(Frame::filled(2, 2, Rgba::BLACK), 32).is_none());
        let outcome = live
            .on_frame_at(Frame::filled(2, 2, Rgba::WHITE), 260)
            .unwrap();
        assert_eq!(outcome.pairs_processed, 3);
        assert_eq!(live.recomputes(), 2);
    }

    #[test]
    fn finish_blends_everything_buffered() {
        let mut live = LiveTrail::new(engine(), 3, 1);
        for (i, v) in [0u8, 0, 200, 200].into_iter().enumerate() {
            live.on_frame_at(Frame::filled(1, 1, Rgba::opaque(v, v, v)), i as u64);
        }
        assert_eq!(live.buffer().len(), 3);
        let outcome = live.finish();
        assert_eq!(outcome.status, BlendStatus::Completed);
        assert_eq!(
            outcome.frame.unwrap().pixel(0, 0),
            Rgba::opaque(200, 200, 200)
        );
    }
}
