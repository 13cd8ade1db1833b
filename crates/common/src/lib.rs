//! difftrail Common Utilities
//!
//! Shared infrastructure for all difftrail crates:
//! - Error types and result aliases
//! - Recompute pacing for live capture
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod pacing;

pub use config::*;
pub use error::*;
pub use pacing::*;
