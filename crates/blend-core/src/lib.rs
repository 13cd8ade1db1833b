//! difftrail Blend Core: difference-accumulation trails
//!
//! Folds an ordered sequence of same-sized frames into a single frame that
//! shows where pixels changed anywhere along the sequence:
//! - **Pixel access:** checked per-pixel and direct-indexed reads, luminance
//! - **Diff metrics:** per-channel, max-channel and approximate luma
//! - **Accumulation:** running per-channel maximum or sticky threshold flags
//! - **Engine:** validation, mode dispatch, the pairwise loop
//!
//! This crate is pure computation: no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod accumulate;
pub mod engine;
pub mod frame;
pub mod metric;
pub mod mode;
pub mod pixel;
pub mod threshold;

pub use engine::{blend, BlendConfig, BlendCost, BlendEngine, BlendOutcome, BlendStatus, ChangeMask};
pub use frame::{Frame, FrameError};
pub use mode::BlendMode;
pub use pixel::Rgba;
pub use threshold::Threshold;
