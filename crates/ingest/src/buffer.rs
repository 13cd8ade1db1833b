//! Bounded frame buffer feeding the blend engine.

use std::collections::VecDeque;

use difftrail_blend::{BlendEngine, BlendOutcome, Frame};

/// Frames kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// FIFO of the most recent frames, oldest first.
///
/// When full, pushing evicts the oldest frame. A frame whose dimensions
/// differ from the buffered ones (e.g. the captured window was resized)
/// restarts the buffer, since the engine only compares same-sized frames.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl FrameBuffer {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Dimensions of the buffered frames, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.front().map(Frame::dimensions)
    }

    /// Append a frame, returning the one evicted to make room.
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        if let Some(current) = self.dimensions() {
            if current != frame.dimensions() {
                tracing::info!(
                    "Frame size changed from {}x{} to {}x{}, restarting buffer",
                    current.0,
                    current.1,
                    frame.width(),
                    frame.height()
                );
                self.frames.clear();
            }
        }

        let evicted = if self.frames.len() == self.capacity {
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(frame);
        evicted
    }

    /// Drop everything and load a new sequence, keeping the newest
    /// `capacity` frames.
    pub fn replace<I: IntoIterator<Item = Frame>>(&mut self, frames: I) {
        self.frames.clear();
        for frame in frames {
            self.push(frame);
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// The buffered frames as one contiguous slice.
    pub fn frames(&mut self) -> &[Frame] {
        self.frames.make_contiguous()
    }

    /// Blend the current contents.
    pub fn recompute(&mut self, engine: &BlendEngine) -> BlendOutcome {
        engine.blend(self.frames.make_contiguous())
    }
}
