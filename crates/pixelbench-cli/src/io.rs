//! Image file loading and saving for the CLI.
//!
//! Frames always enter as RGBA so every input format lands in one layout
//! the bridge knows how to canonicalize.

use std::path::Path;

use pixelbench_core::{PixelLayout, SharedFrame};

/// Decode an image file into a caller-owned RGBA frame.
pub fn load_frame(path: &Path) -> Result<SharedFrame, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SharedFrame::new(width, height, PixelLayout::Rgba, rgba.into_raw())
        .map_err(|e| e.to_string())
}

/// Write the frame's current pixels to an image file. The format follows
/// the output extension.
pub fn save_frame(frame: &SharedFrame, path: &Path) -> Result<(), String> {
    let pixels = frame.snapshot().map_err(|e| e.to_string())?;
    let buffer: image::RgbaImage =
        image::ImageBuffer::from_raw(frame.width(), frame.height(), pixels)
            .ok_or_else(|| "Frame bytes do not match its dimensions".to_string())?;
    buffer
        .save(path)
        .map_err(|e| format!("Failed to save {}: {}", path.display(), e))
}
