//! Frame buffer model: raw pixel bytes with explicit dimensions and layout.
//!
//! The operations in this crate compute over a canonical single-channel
//! representation. Multi-channel frames enter through the bridge, which
//! converts them with the helpers here and restores the original layout on
//! the way out.

use std::fmt;

use crate::error::ProcessError;

/// BT.601 luma weights used for every multi-channel to grayscale conversion.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Channel layout of a frame's pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Single-channel luminance, one byte per pixel.
    Gray,
    /// Interleaved RGB, three bytes per pixel.
    Rgb,
    /// Interleaved RGBA, four bytes per pixel, alpha meaningful.
    Rgba,
    /// Interleaved RGB with a padding byte, four bytes per pixel. The
    /// fourth byte is ignored on read and written as 255.
    Rgbx,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba | PixelLayout::Rgbx => 4,
        }
    }
}

/// A raw image buffer with explicit dimensions and channel layout.
///
/// Invariant, enforced at construction: `data.len() == width * height *
/// layout.channels()` and both dimensions are non-zero. Code holding a
/// `FrameBuffer` may rely on it.
#[derive(Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a frame from existing pixel data, validating the invariant.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, ProcessError> {
        if width == 0 || height == 0 {
            return Err(ProcessError::InvalidRequest(format!(
                "frame dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(ProcessError::InvalidRequest(format!(
                "frame data is {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                expected,
                width,
                height,
                layout
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Create a frame with every byte set to `value`.
    pub fn filled(
        width: u32,
        height: u32,
        layout: PixelLayout,
        value: u8,
    ) -> Result<Self, ProcessError> {
        let len = width as usize * height as usize * layout.channels();
        Self::new(width, height, layout, vec![value; len])
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel bytes in row-major interleaved order.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame, returning its pixel storage.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Convert this frame to the canonical single-channel layout.
    ///
    /// `Gray` input is copied as-is; multi-channel input is reduced to
    /// BT.601 luminance. Alpha and padding bytes are discarded.
    pub fn to_canonical(&self) -> FrameBuffer {
        let data = match self.layout {
            PixelLayout::Gray => self.data.clone(),
            layout => {
                let channels = layout.channels();
                self.data
                    .chunks_exact(channels)
                    .map(|px| {
                        let y = LUMA_WEIGHTS[0] * px[0] as f32
                            + LUMA_WEIGHTS[1] * px[1] as f32
                            + LUMA_WEIGHTS[2] * px[2] as f32;
                        y.clamp(0.0, 255.0).round() as u8
                    })
                    .collect()
            }
        };
        FrameBuffer {
            width: self.width,
            height: self.height,
            layout: PixelLayout::Gray,
            data,
        }
    }

    /// Expand a canonical single-channel frame into `target` layout bytes.
    ///
    /// Luminance is replicated across the color channels; alpha and padding
    /// bytes are written as 255. Fails when called on a multi-channel frame.
    pub fn expand_to(&self, target: PixelLayout) -> Result<Vec<u8>, ProcessError> {
        if self.layout != PixelLayout::Gray {
            return Err(ProcessError::ResultConstruction(format!(
                "expected a canonical single-channel frame, got {:?}",
                self.layout
            )));
        }
        let out = match target {
            PixelLayout::Gray => self.data.clone(),
            PixelLayout::Rgb => {
                let mut out = Vec::with_capacity(self.data.len() * 3);
                for &y in &self.data {
                    out.extend_from_slice(&[y, y, y]);
                }
                out
            }
            PixelLayout::Rgba | PixelLayout::Rgbx => {
                let mut out = Vec::with_capacity(self.data.len() * 4);
                for &y in &self.data {
                    out.extend_from_slice(&[y, y, y, 255]);
                }
                out
            }
        };
        Ok(out)
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FrameBuffer {{ {}x{} {:?}, {} bytes }}",
            self.width,
            self.height,
            self.layout,
            self.data.len()
        )
    }
}
