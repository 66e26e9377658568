//! Similarity scores between a recovered pattern and the embedded one.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatermarkError};

/// Threshold used by [`ExtractionScore`] to binarize patterns.
pub const BIT_THRESHOLD: u8 = 128;

fn ensure_same_size(a: &GrayImage, b: &GrayImage) -> Result<()> {
    if a.dimensions() != b.dimensions() {
        return Err(WatermarkError::DimensionMismatch {
            test: a.dimensions(),
            original: b.dimensions(),
        });
    }
    Ok(())
}

fn pairs<'a>(a: &'a GrayImage, b: &'a GrayImage) -> impl Iterator<Item = (f64, f64)> + 'a {
    a.as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(&p, &q)| (f64::from(p), f64::from(q)))
}

/// Mean absolute per-pixel difference, in intensity levels.
pub fn mean_absolute_error(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    ensure_same_size(a, b)?;
    let count = a.as_raw().len();
    if count == 0 {
        return Ok(0.0);
    }
    let total: f64 = pairs(a, b).map(|(p, q)| (p - q).abs()).sum();
    Ok(total / count as f64)
}

/// Peak signal-to-noise ratio in dB. Infinite for identical inputs.
pub fn psnr(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    ensure_same_size(a, b)?;
    let count = a.as_raw().len();
    if count == 0 {
        return Ok(f64::INFINITY);
    }
    let mse: f64 = pairs(a, b).map(|(p, q)| (p - q).powi(2)).sum::<f64>() / count as f64;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}

/// Zero-mean normalized cross-correlation in [-1, 1].
///
/// Returns 0 when either input is constant.
pub fn normalized_correlation(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    ensure_same_size(a, b)?;
    let count = a.as_raw().len();
    if count == 0 {
        return Ok(0.0);
    }

    let (sum_a, sum_b) = pairs(a, b).fold((0.0, 0.0), |(sa, sb), (p, q)| (sa + p, sb + q));
    let (mean_a, mean_b) = (sum_a / count as f64, sum_b / count as f64);

    let (mut cross, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (p, q) in pairs(a, b) {
        let (da, db) = (p - mean_a, q - mean_b);
        cross += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return Ok(0.0);
    }
    Ok((cross / (var_a * var_b).sqrt()).clamp(-1.0, 1.0))
}

/// Fraction of positions whose bits (`value >= threshold`) agree.
pub fn bit_match_ratio(a: &GrayImage, b: &GrayImage, threshold: u8) -> Result<f64> {
    ensure_same_size(a, b)?;
    let count = a.as_raw().len();
    if count == 0 {
        return Ok(1.0);
    }
    let matches = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .filter(|(p, q)| (**p >= threshold) == (**q >= threshold))
        .count();
    Ok(matches as f64 / count as f64)
}

/// All scores for one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionScore {
    pub mae: f64,
    /// `None` for a perfect recovery (infinite PSNR).
    pub psnr: Option<f64>,
    pub correlation: f64,
    pub bit_match: f64,
}

impl ExtractionScore {
    pub fn compare(recovered: &GrayImage, embedded: &GrayImage) -> Result<Self> {
        let psnr = psnr(recovered, embedded)?;
        Ok(Self {
            mae: mean_absolute_error(recovered, embedded)?,
            psnr: psnr.is_finite().then_some(psnr),
            correlation: normalized_correlation(recovered, embedded)?,
            bit_match: bit_match_ratio(recovered, embedded, BIT_THRESHOLD)?,
        })
    }
}
