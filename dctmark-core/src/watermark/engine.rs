//! Additive watermark embedding and non-blind extraction.
//!
//! # Algorithm
//!
//! Embedding adds `strength * pattern / 255` into a fixed block of the
//! host's DCT coefficients and transforms back. Extraction transforms both
//! the suspect image and the original, subtracts the two blocks, divides by
//! `strength` and rescales to 8-bit intensities.
//!
//! Extraction needs the original image. It also needs the suspect image to
//! be aligned with the original: after a shift, crop or flip the region no
//! longer addresses the perturbed coefficients and the estimate degrades
//! into noise without any error being raised.
//!
//! # Usage
//!
//! ```
//! use dctmark_core::{EmbeddingRegion, WatermarkEngine, WatermarkPattern};
//! use image::{GrayImage, Luma};
//!
//! # fn example() -> dctmark_core::Result<()> {
//! let host = GrayImage::from_pixel(256, 256, Luma([128]));
//! let engine = WatermarkEngine::new(EmbeddingRegion::square(100, 100, 32), 10.0)?;
//! let pattern = WatermarkPattern::checkerboard(32, 32);
//!
//! let watermarked = engine.embed(&host, &pattern)?;
//! let recovered = engine.extract(&watermarked, &host)?;
//! assert_eq!(recovered.dimensions(), (32, 32));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use image::{GrayImage, Luma};
use tracing::debug;

use super::pattern::{WatermarkPattern, MAX_INTENSITY};
use crate::codec;
use crate::error::{Result, WatermarkError};
use crate::region::EmbeddingRegion;

/// Default embedding strength.
pub const DEFAULT_STRENGTH: f64 = 10.0;

/// Embeds `watermark` into the `region` coefficients of `host`.
///
/// The pattern must already be sized to the region (see
/// [`WatermarkPattern::fit`]). `strength` must be finite and non-negative; a
/// strength of zero leaves the coefficients untouched.
///
/// # Errors
///
/// - [`WatermarkError::InvalidParameter`] for a negative or non-finite strength
/// - [`WatermarkError::Shape`] if the pattern size differs from the region
///   size, or the region does not fit inside the host
pub fn embed(
    host: &GrayImage,
    watermark: &WatermarkPattern,
    region: &EmbeddingRegion,
    strength: f64,
) -> Result<GrayImage> {
    if !strength.is_finite() || strength < 0.0 {
        return Err(WatermarkError::InvalidParameter(format!(
            "embedding strength must be finite and >= 0, got {strength}"
        )));
    }
    if watermark.dimensions() != region.size() {
        return Err(WatermarkError::Shape {
            context: "watermark pattern vs embedding region",
            expected: region.size(),
            actual: watermark.dimensions(),
        });
    }
    region.check_fits(host.dimensions(), "embedding region vs host image")?;

    debug!(
        host = ?host.dimensions(),
        region = %region,
        strength,
        "Embedding watermark"
    );

    let mut coeffs = codec::forward(host);
    coeffs.add_to_region(region, &watermark.normalized(), strength)?;
    Ok(codec::inverse(&coeffs))
}

/// Recovers the pattern embedded in `test_image` by comparison with
/// `original`.
///
/// Both images must have identical dimensions. The engine never resizes
/// them; callers that ran a size-changing attack resize first.
///
/// # Errors
///
/// - [`WatermarkError::InvalidParameter`] if `strength` is not finite and > 0
/// - [`WatermarkError::DimensionMismatch`] if the two images differ in size
/// - [`WatermarkError::Shape`] if the region does not fit inside the images
pub fn extract(
    test_image: &GrayImage,
    original: &GrayImage,
    region: &EmbeddingRegion,
    strength: f64,
) -> Result<WatermarkPattern> {
    if !strength.is_finite() || strength <= 0.0 {
        return Err(WatermarkError::InvalidParameter(format!(
            "extraction strength must be finite and > 0, got {strength}"
        )));
    }
    if test_image.dimensions() != original.dimensions() {
        return Err(WatermarkError::DimensionMismatch {
            test: test_image.dimensions(),
            original: original.dimensions(),
        });
    }
    region.check_fits(original.dimensions(), "embedding region vs original image")?;

    debug!(
        image = ?original.dimensions(),
        region = %region,
        strength,
        "Extracting watermark"
    );

    let test_coeffs = codec::forward(test_image);
    let orig_coeffs = codec::forward(original);
    let difference = &test_coeffs.region(region)? - &orig_coeffs.region(region)?;

    let recovered = GrayImage::from_fn(region.width, region.height, |x, y| {
        let level = (difference[[y as usize, x as usize]] / strength).clamp(0.0, 1.0);
        Luma([(level * MAX_INTENSITY).round() as u8])
    });
    Ok(WatermarkPattern::from_image(recovered))
}

/// Region and strength bundled so that paired embed/extract calls cannot
/// disagree on either.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkEngine {
    region: EmbeddingRegion,
    strength: f64,
}

impl WatermarkEngine {
    /// Strength must be finite and strictly positive, since the same value
    /// divides the coefficient difference during extraction.
    pub fn new(region: EmbeddingRegion, strength: f64) -> Result<Self> {
        if !strength.is_finite() || strength <= 0.0 {
            return Err(WatermarkError::InvalidParameter(format!(
                "strength must be finite and > 0, got {strength}"
            )));
        }
        if region.is_empty() {
            return Err(WatermarkError::InvalidParameter(format!(
                "embedding region must have a non-zero size, got {region}"
            )));
        }
        Ok(Self { region, strength })
    }

    pub fn region(&self) -> EmbeddingRegion {
        self.region
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Resize an arbitrary image into a pattern of this engine's region size.
    pub fn fit_pattern(&self, image: &GrayImage) -> Result<WatermarkPattern> {
        WatermarkPattern::fit(image, self.region.size())
    }

    pub fn embed(&self, host: &GrayImage, watermark: &WatermarkPattern) -> Result<GrayImage> {
        embed(host, watermark, &self.region, self.strength)
    }

    pub fn extract(&self, test_image: &GrayImage, original: &GrayImage) -> Result<WatermarkPattern> {
        extract(test_image, original, &self.region, self.strength)
    }
}
