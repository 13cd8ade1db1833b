//! Pixel access and luminance conversion.
//!
//! [`PixelView`] gives O(1) indexed reads over a packed RGBA8 buffer. The
//! checked accessors return `Option`; the `_unchecked` variants skip the
//! bounds check in release builds and assert it in debug builds. The engine
//! only uses the unchecked path after it has verified that every frame in
//! the sequence has the canvas dimensions.

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Bytes per pixel in every frame buffer.
pub const CHANNELS: usize = 4;

/// An RGBA8 pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0[2]
    }

    /// Color channels only, alpha dropped.
    #[inline]
    pub fn rgb(self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// True when all color channels are zero. Alpha is ignored.
    #[inline]
    pub fn is_black(self) -> bool {
        self.rgb() == [0, 0, 0]
    }
}

/// Luminance with BT.601 weights (0.299, 0.587, 0.114) in 8.8 fixed point,
/// rounded to nearest.
#[inline]
pub fn perceptual_luma(px: Rgba) -> u8 {
    ((77 * px.r() as u32 + 150 * px.g() as u32 + 29 * px.b() as u32 + 128) >> 8) as u8
}

/// Unweighted channel mean, truncated.
#[inline]
pub fn approx_luma(px: Rgba) -> u8 {
    ((px.r() as u32 + px.g() as u32 + px.b() as u32) / 3) as u8
}

/// Read-only indexed view over an RGBA8 buffer.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u8],
}

impl<'a> PixelView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        debug_assert_eq!(data.len() % CHANNELS, 0);
        Self { data }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<Rgba> {
        let off = idx.checked_mul(CHANNELS)?;
        let px = self.data.get(off..off + CHANNELS)?;
        Some(Rgba([px[0], px[1], px[2], px[3]]))
    }

    /// # Safety
    ///
    /// `idx` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, idx: usize) -> Rgba {
        debug_assert!(idx < self.len(), "pixel index {idx} >= {}", self.len());
        let off = idx * CHANNELS;
        // SAFETY: caller guarantees idx < len, so off + 3 < data.len().
        unsafe {
            Rgba([
                *self.data.get_unchecked(off),
                *self.data.get_unchecked(off + 1),
                *self.data.get_unchecked(off + 2),
                *self.data.get_unchecked(off + 3),
            ])
        }
    }
}

/// Mutable indexed view over an RGBA8 buffer. Only the engine writes pixels.
#[derive(Debug)]
pub(crate) struct PixelViewMut<'a> {
    data: &'a mut [u8],
}

impl<'a> PixelViewMut<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        debug_assert_eq!(data.len() % CHANNELS, 0);
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Write one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[inline]
    pub fn set(&mut self, idx: usize, color: Rgba) {
        let off = idx * CHANNELS;
        self.data[off..off + CHANNELS].copy_from_slice(&color.0);
    }

    /// # Safety
    ///
    /// `idx` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, idx: usize) -> Rgba {
        // SAFETY: forwarded caller contract.
        unsafe { PixelView::new(&*self.data).get_unchecked(idx) }
    }

    /// # Safety
    ///
    /// `idx` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn set_unchecked(&mut self, idx: usize, color: Rgba) {
        debug_assert!(idx < self.len(), "pixel index {idx} >= {}", self.len());
        let off = idx * CHANNELS;
        // SAFETY: caller guarantees idx < len, so the 4-byte range is in bounds.
        unsafe {
            self.data
                .get_unchecked_mut(off..off + CHANNELS)
                .copy_from_slice(&color.0);
        }
    }
}

/// One 8-bit luminance value per pixel, row-major like the source frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LumaPlane {
    data: Vec<u8>,
}

impl LumaPlane {
    /// Convert a frame with [`perceptual_luma`].
    pub fn from_frame(frame: &Frame) -> Self {
        let view = frame.view();
        let data = (0..view.len())
            .filter_map(|idx| view.get(idx))
            .map(perceptual_luma)
            .collect();
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// # Safety
    ///
    /// `idx` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, idx: usize) -> u8 {
        debug_assert!(idx < self.len(), "luma index {idx} >= {}", self.len());
        // SAFETY: caller guarantees idx < len.
        unsafe { *self.data.get_unchecked(idx) }
    }
}
