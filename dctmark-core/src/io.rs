//! Image file loading and saving.
//!
//! Everything is converted to 8-bit grayscale on load. The output format is
//! chosen from the file extension.

use std::path::Path;

use image::GrayImage;
use tracing::debug;

use crate::error::{Result, WatermarkError};
use crate::watermark::WatermarkPattern;

/// Decode an image file and convert it to 8-bit grayscale.
pub fn load_grayscale(path: impl AsRef<Path>) -> Result<GrayImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| WatermarkError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Loaded image");
    Ok(image.to_luma8())
}

/// Load a watermark image and resize it to `size` (`(width, height)`).
pub fn load_watermark(path: impl AsRef<Path>, size: (u32, u32)) -> Result<WatermarkPattern> {
    let image = load_grayscale(path)?;
    WatermarkPattern::fit(&image, size)
}

/// Encode `image` to `path`, format inferred from the extension.
pub fn save_grayscale(image: &GrayImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|e| WatermarkError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "Saved image");
    Ok(())
}
