//! Photometric attacks: contrast rescale and Gaussian blur.
//!
//! Both keep every pixel where it was, so the embedding region stays aligned.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::codec::to_intensity;
use crate::error::{Result, WatermarkError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastParams {
    pub factor: f64,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self { factor: 1.5 }
    }
}

/// Largest accepted blur kernel width.
pub const MAX_KERNEL_SIZE: u32 = 1001;

/// Gaussian kernel width in pixels. Must be odd, at least 3 and at most
/// [`MAX_KERNEL_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlurParams {
    pub kernel_size: u32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self { kernel_size: 5 }
    }
}

impl BlurParams {
    /// Standard deviation implied by the kernel size.
    pub fn sigma(&self) -> f64 {
        0.3 * ((f64::from(self.kernel_size) - 1.0) * 0.5 - 1.0) + 0.8
    }
}

pub(crate) fn validate_contrast(params: ContrastParams) -> Result<()> {
    if !params.factor.is_finite() || params.factor < 0.0 {
        return Err(WatermarkError::InvalidParameter(format!(
            "contrast factor must be finite and >= 0, got {}",
            params.factor
        )));
    }
    Ok(())
}

pub(crate) fn validate_blur(params: BlurParams) -> Result<()> {
    let size = params.kernel_size;
    if !(3..=MAX_KERNEL_SIZE).contains(&size) || size % 2 == 0 {
        return Err(WatermarkError::InvalidParameter(format!(
            "blur kernel size must be odd and between 3 and {MAX_KERNEL_SIZE}, got {size}"
        )));
    }
    Ok(())
}

/// Multiply every intensity by `factor`, rounding and clamping to [0, 255].
pub fn contrast(image: &GrayImage, params: ContrastParams) -> Result<GrayImage> {
    validate_contrast(params)?;

    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = to_intensity(f64::from(pixel[0]) * params.factor);
    }
    Ok(output)
}

/// Normalized 1-D Gaussian kernel for `params`.
pub fn gaussian_kernel(params: BlurParams) -> Result<Vec<f64>> {
    validate_blur(params)?;

    let sigma = params.sigma();
    let half = (params.kernel_size / 2) as i64;
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|offset| (-((offset * offset) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    Ok(kernel)
}

/// Separable Gaussian blur, horizontal pass then vertical pass.
///
/// Samples outside the image are mirrored about the edge pixel without
/// repeating it (`dcb|abcd|cba`).
pub fn gaussian_blur(image: &GrayImage, params: BlurParams) -> Result<GrayImage> {
    let kernel = gaussian_kernel(params)?;
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return Ok(image.clone());
    }

    let half = (kernel.len() / 2) as isize;
    let pixels = image.as_raw();

    let mut horizontal = vec![0.0f64; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = mirror_index(x as isize + k as isize - half, w);
                sum += f64::from(pixels[y * w + sx]) * weight;
            }
            horizontal[y * w + x] = sum;
        }
    }

    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);
        let mut sum = 0.0;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = mirror_index(y as isize + k as isize - half, h);
            sum += horizontal[sy * w + x] * weight;
        }
        pixel[0] = to_intensity(sum);
    }

    Ok(output)
}

/// Mirror-reflect an index into [0, size-1].
///
/// Folds repeatedly, so offsets wider than the image still land on the
/// reflected sample rather than the edge.
#[inline]
fn mirror_index(idx: isize, size: usize) -> usize {
    if size <= 1 {
        return 0;
    }
    let period = 2 * (size as isize - 1);
    let folded = idx.rem_euclid(period);
    if folded < size as isize {
        folded as usize
    } else {
        (period - folded) as usize
    }
}
