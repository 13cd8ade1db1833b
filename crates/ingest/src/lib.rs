//! difftrail Ingest
//!
//! Everything around the blend engine that touches the outside world:
//! frame producers, the live buffer, and the result sink.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────┐
//! │ Image files  │   │ BackendChain → CaptureLoop│
//! │ (files.rs)   │   │ (capture.rs)             │
//! └──────┬───────┘   └────────────┬─────────────┘
//!        │ Vec<Frame>             │ Frame per tick
//!        ▼                        ▼
//! ┌─────────────────────────────────────────────┐
//! │    FrameBuffer / LiveTrail (buffer, live)   │
//! └──────────────────────┬──────────────────────┘
//!                        │ &[Frame]
//!                        ▼
//!               difftrail_blend::BlendEngine
//!                        │ trail Frame
//!                        ▼
//!                 save_frame (output.rs)
//! ```

pub mod buffer;
pub mod capture;
pub mod files;
pub mod live;
pub mod output;

pub use buffer::FrameBuffer;
pub use capture::{
    BackendChain, CaptureBackend, CaptureControl, CaptureLoop, CaptureLoopConfig, CaptureRegion,
    CaptureStats, SequenceBackend,
};
pub use files::{load_frames, LoadReport};
pub use live::LiveTrail;
pub use output::save_frame;
