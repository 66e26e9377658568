//! Watermark patterns: the small grayscale images carried in the region.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, WatermarkError};

/// Maximum representable intensity, used to normalize patterns to [0, 1].
pub const MAX_INTENSITY: f64 = 255.0;

/// Grayscale watermark pattern.
///
/// Produced once (loaded and resized to the region size) and only read
/// afterwards. Extraction also returns its estimate as a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkPattern(GrayImage);

impl WatermarkPattern {
    /// Wrap an image as-is, without resizing.
    pub fn from_image(image: GrayImage) -> Self {
        Self(image)
    }

    /// Resize `image` to exactly `size` (`(width, height)`) with a triangle
    /// filter. Images that already match are copied unchanged.
    pub fn fit(image: &GrayImage, size: (u32, u32)) -> Result<Self> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(WatermarkError::InvalidParameter(format!(
                "watermark size must be non-zero, got {width}x{height}"
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(WatermarkError::InvalidParameter(
                "watermark image is empty".into(),
            ));
        }

        if image.dimensions() == size {
            return Ok(Self(image.clone()));
        }

        debug!(
            from = ?image.dimensions(),
            to = ?size,
            "Resizing watermark pattern"
        );
        Ok(Self(imageops::resize(
            image,
            width,
            height,
            FilterType::Triangle,
        )))
    }

    /// Alternating 0/255 cells, starting with 0 at the top-left.
    pub fn checkerboard(width: u32, height: u32) -> Self {
        Self(GrayImage::from_fn(width, height, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
        }))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    /// Intensities divided by 255, indexed `[row, column]`.
    pub fn normalized(&self) -> Array2<f64> {
        Array2::from_shape_fn(
            (self.height() as usize, self.width() as usize),
            |(row, col)| f64::from(self.0.get_pixel(col as u32, row as u32)[0]) / MAX_INTENSITY,
        )
    }
}

impl From<GrayImage> for WatermarkPattern {
    fn from(image: GrayImage) -> Self {
        Self::from_image(image)
    }
}
