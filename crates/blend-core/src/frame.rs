//! Frames: immutable RGBA8 pixel grids.

use crate::pixel::{PixelView, PixelViewMut, Rgba, CHANNELS};

/// Errors raised when constructing or slicing frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error(
        "buffer holds {actual} bytes but a {width}x{height} frame with {channels} channels needs {expected}"
    )]
    BufferSize {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    #[error("region {width}x{height} at ({x}, {y}) lies outside a {frame_width}x{frame_height} frame")]
    EmptyRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// One captured or loaded image.
///
/// Pixels are stored row-major as RGBA8. Sources without alpha get 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a raw RGBA8 buffer.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = buffer_len(width, height, CHANNELS);
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                channels: CHANNELS,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an opaque frame from a packed RGB8 buffer.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self, FrameError> {
        let expected = buffer_len(width, height, 3);
        if rgb.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                channels: 3,
                expected,
                actual: rgb.len(),
            });
        }
        let mut data = Vec::with_capacity(buffer_len(width, height, CHANNELS));
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&color.0);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut data = Vec::with_capacity(buffer_len(width, height, CHANNELS));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).0);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        match self.get_pixel(x, y) {
            Some(px) => px,
            None => panic!(
                "pixel ({x}, {y}) out of bounds for {}x{} frame",
                self.width, self.height
            ),
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.view().get(self.index_of(x, y))
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Direct-indexing view over the pixels.
    pub fn view(&self) -> PixelView<'_> {
        PixelView::new(&self.data)
    }

    /// Copy out the intersection of the frame with the given rectangle.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Frame, FrameError> {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end || y >= y_end {
            return Err(FrameError::EmptyRegion {
                x,
                y,
                width,
                height,
                frame_width: self.width,
                frame_height: self.height,
            });
        }

        let row_bytes = (x_end - x) as usize * CHANNELS;
        let mut data = Vec::with_capacity(row_bytes * (y_end - y) as usize);
        for row in y..y_end {
            let start = self.index_of(x, row) * CHANNELS;
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Ok(Frame {
            width: x_end - x,
            height: y_end - y,
            data,
        })
    }

    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = self.index_of(x, y);
        self.view_mut().set(idx, color);
    }

    pub(crate) fn view_mut(&mut self) -> PixelViewMut<'_> {
        PixelViewMut::new(&mut self.data)
    }

    fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

fn buffer_len(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}
