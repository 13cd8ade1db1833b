//! Change threshold for the sticky-flag modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cutoff magnitude in `[0, 255]`; a pixel is flagged when its metric is
/// strictly greater.
///
/// Around 5 is very sensitive, 15 to 20 ignores most noise, 30 and above only
/// reacts to large changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(u8);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(30);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn exceeded_by(self, magnitude: u8) -> bool {
        magnitude > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for Threshold {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
