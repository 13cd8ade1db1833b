//! Pacing utilities for live capture.
//!
//! A trail recompute costs `O(frames * width * height)`, so while frames
//! arrive every few milliseconds the recompute has to run at a lower,
//! bounded rate. Timestamps are plain elapsed milliseconds so callers can
//! drive the controller from any clock.

use std::time::Instant;

/// Gate that lets at most one tick through per interval.
#[derive(Debug)]
pub struct RateController {
    target_interval_ms: u64,
    last_tick_ms: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate. A rate of 0 is
    /// treated as 1 Hz.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ms: 1_000 / target_hz.max(1) as u64,
            last_tick_ms: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ms: u64) -> bool {
        match self.last_tick_ms {
            None => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            Some(last) if current_ms >= last + self.target_interval_ms => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            _ => false,
        }
    }

    /// Target interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.target_interval_ms
    }
}

/// Monotonic millisecond clock anchored at creation.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
