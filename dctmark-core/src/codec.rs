//! Separable orthonormal DCT between sample grids and coefficient grids.
//!
//! `forward` runs an orthonormal DCT-II along every row and then along every
//! column. `inverse` runs the orthonormal DCT-III in the opposite order
//! (columns, then rows) and saturates the result to 8-bit intensities.
//!
//! `rustdct` computes the unnormalized transforms, so both directions apply
//! the orthonormal scale factors explicitly: `sqrt(1/N)` for the DC term and
//! `sqrt(2/N)` for every other term.

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2, Axis};
use rustdct::{Dct2, Dct3, DctPlanner};
use tracing::trace;

use crate::error::{Result, WatermarkError};
use crate::region::EmbeddingRegion;

/// Frequency-domain coefficients of a grayscale image.
///
/// Indexed `[row, column]`, with the same height and width as the image it
/// was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientGrid(Array2<f64>);

impl CoefficientGrid {
    pub fn from_array(coefficients: Array2<f64>) -> Self {
        Self(coefficients)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }

    pub fn into_array(self) -> Array2<f64> {
        self.0
    }

    pub fn width(&self) -> u32 {
        self.0.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.0.nrows() as u32
    }

    /// `(width, height)`, matching `GrayImage::dimensions`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Read-only view of the coefficients inside `region`.
    pub fn region(&self, region: &EmbeddingRegion) -> Result<ArrayView2<'_, f64>> {
        region.check_fits(self.dimensions(), "coefficient grid region")?;
        Ok(self.0.slice(ndarray::s![region.rows(), region.cols()]))
    }

    /// Adds `scale * delta` element-wise into the coefficients of `region`.
    ///
    /// `delta` must be exactly `region.height` rows by `region.width` columns.
    pub fn add_to_region(
        &mut self,
        region: &EmbeddingRegion,
        delta: &Array2<f64>,
        scale: f64,
    ) -> Result<()> {
        region.check_fits(self.dimensions(), "coefficient grid region")?;

        let (rows, cols) = delta.dim();
        if (cols as u32, rows as u32) != region.size() {
            return Err(WatermarkError::Shape {
                context: "region delta",
                expected: region.size(),
                actual: (cols as u32, rows as u32),
            });
        }

        self.0
            .slice_mut(ndarray::s![region.rows(), region.cols()])
            .scaled_add(scale, delta);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

/// Forward transform: promotes intensities to `f64`, then rows, then columns.
pub fn forward(grid: &GrayImage) -> CoefficientGrid {
    let (width, height) = grid.dimensions();
    let mut data = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        f64::from(grid.get_pixel(col as u32, row as u32)[0])
    });

    if !data.is_empty() {
        let mut planner = DctPlanner::new();
        transform_lanes(&mut data, Axis(1), &mut planner, Direction::Forward);
        transform_lanes(&mut data, Axis(0), &mut planner, Direction::Forward);
    }

    trace!(width, height, "Forward DCT");
    CoefficientGrid(data)
}

/// Inverse transform without saturation or rounding.
pub fn inverse_real(coeffs: &CoefficientGrid) -> Array2<f64> {
    let mut data = coeffs.0.clone();

    if !data.is_empty() {
        let mut planner = DctPlanner::new();
        transform_lanes(&mut data, Axis(0), &mut planner, Direction::Inverse);
        transform_lanes(&mut data, Axis(1), &mut planner, Direction::Inverse);
    }

    data
}

/// Inverse transform, clamped to [0, 255] and rounded to the nearest level.
pub fn inverse(coeffs: &CoefficientGrid) -> GrayImage {
    let data = inverse_real(coeffs);
    let (width, height) = coeffs.dimensions();

    trace!(width, height, "Inverse DCT");
    GrayImage::from_fn(width, height, |x, y| {
        Luma([to_intensity(data[[y as usize, x as usize]])])
    })
}

/// Saturating conversion of a real sample to an 8-bit intensity.
pub(crate) fn to_intensity(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Transforms every 1-D lane of `data` that runs along `axis`.
///
/// `Axis(1)` lanes are rows, `Axis(0)` lanes are columns.
fn transform_lanes(
    data: &mut Array2<f64>,
    axis: Axis,
    planner: &mut DctPlanner<f64>,
    direction: Direction,
) {
    let len = data.len_of(axis);
    let plan = match direction {
        Direction::Forward => planner.plan_dct2(len),
        Direction::Inverse => planner.plan_dct3(len),
    };

    let dc_scale = (1.0 / len as f64).sqrt();
    let ac_scale = (2.0 / len as f64).sqrt();
    let mut buffer = vec![0.0; len];

    for mut lane in data.lanes_mut(axis) {
        for (dst, src) in buffer.iter_mut().zip(lane.iter()) {
            *dst = *src;
        }

        match direction {
            Direction::Forward => {
                plan.process_dct2(&mut buffer);
                buffer[0] *= dc_scale;
                buffer[1..].iter_mut().for_each(|c| *c *= ac_scale);
            }
            Direction::Inverse => {
                // DCT-III halves its first input.
                buffer[0] *= 2.0 * dc_scale;
                buffer[1..].iter_mut().for_each(|c| *c *= ac_scale);
                plan.process_dct3(&mut buffer);
            }
        }

        for (dst, src) in lane.iter_mut().zip(buffer.iter()) {
            *dst = *src;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random grid covering the full intensity range.
    fn noise_image(width: u32, height: u32, seed: u32) -> GrayImage {
        let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
        GrayImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Luma([(state >> 24) as u8])
        })
    }

    fn gradient_image(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 255 / width.max(1) + y * 3) % 256) as u8])
        })
    }

    fn max_abs_diff(a: &GrayImage, b: &GrayImage) -> u8 {
        a.pixels()
            .zip(b.pixels())
            .map(|(p, q)| p[0].abs_diff(q[0]))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_roundtrip_within_one_level() {
        for (width, height, seed) in [(64, 64, 1), (256, 256, 7), (48, 80, 3), (1, 17, 5)] {
            let image = noise_image(width, height, seed);
            let restored = inverse(&forward(&image));
            assert_eq!(restored.dimensions(), image.dimensions());
            assert!(
                max_abs_diff(&image, &restored) <= 1,
                "roundtrip drifted for {}x{}",
                width,
                height
            );
        }
    }

    #[test]
    fn test_roundtrip_gradient_is_exact() {
        let image = gradient_image(128, 96);
        assert_eq!(inverse(&forward(&image)), image);
    }

    #[test]
    fn test_forward_preserves_dimensions() {
        let coeffs = forward(&gradient_image(40, 24));
        assert_eq!(coeffs.dimensions(), (40, 24));
        assert_eq!(coeffs.as_array().dim(), (24, 40));
    }

    #[test]
    fn test_constant_image_has_only_dc() {
        let image = GrayImage::from_pixel(16, 16, Luma([128]));
        let coeffs = forward(&image);
        let data = coeffs.as_array();

        // Orthonormal DC term is mean * sqrt(H * W).
        assert!((data[[0, 0]] - 128.0 * 16.0).abs() < 1e-9);
        let ac_energy: f64 = data.iter().skip(1).map(|c| c * c).sum();
        assert!(ac_energy < 1e-12, "AC energy was {}", ac_energy);
    }

    #[test]
    fn test_transform_preserves_energy() {
        let image = noise_image(32, 24, 11);
        let spatial: f64 = image.pixels().map(|p| f64::from(p[0]).powi(2)).sum();
        let spectral: f64 = forward(&image).as_array().iter().map(|c| c * c).sum();
        assert!((spatial - spectral).abs() / spatial < 1e-9);
    }

    #[test]
    fn test_inverse_real_is_unclamped() {
        let mut coeffs = forward(&GrayImage::from_pixel(8, 8, Luma([250])));
        let bump = Array2::from_elem((1, 1), 1.0);
        coeffs
            .add_to_region(&EmbeddingRegion::new(0, 0, 1, 1), &bump, 80.0)
            .unwrap();

        // +80 on the DC of an 8x8 grid lifts every sample by 10.
        let real = inverse_real(&coeffs);
        assert!(real.iter().all(|v| (v - 260.0).abs() < 1e-9));
        assert!(inverse(&coeffs).pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_empty_image() {
        let image = GrayImage::new(0, 0);
        let coeffs = forward(&image);
        assert_eq!(coeffs.dimensions(), (0, 0));
        assert_eq!(inverse(&coeffs).dimensions(), (0, 0));
    }

    #[test]
    fn test_region_view() {
        let coeffs = forward(&gradient_image(64, 64));
        let region = EmbeddingRegion::new(4, 8, 6, 2);
        let view = coeffs.region(&region).unwrap();
        assert_eq!(view.dim(), (2, 6));
        assert_eq!(view[[0, 0]], coeffs.as_array()[[8, 4]]);
        assert_eq!(view[[1, 5]], coeffs.as_array()[[9, 9]]);
    }

    #[test]
    fn test_region_out_of_bounds() {
        let coeffs = forward(&gradient_image(64, 64));
        let region = EmbeddingRegion::new(60, 0, 8, 8);
        assert!(matches!(
            coeffs.region(&region),
            Err(WatermarkError::Shape { .. })
        ));
    }

    #[test]
    fn test_add_to_region_rejects_wrong_delta_shape() {
        let mut coeffs = forward(&gradient_image(64, 64));
        let region = EmbeddingRegion::new(0, 0, 8, 4);
        let delta = Array2::zeros((8, 4));
        let err = coeffs.add_to_region(&region, &delta, 1.0).unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::Shape {
                expected: (8, 4),
                actual: (4, 8),
                ..
            }
        ));
    }

    #[test]
    fn test_add_to_region_touches_only_region() {
        let original = forward(&gradient_image(32, 32));
        let mut coeffs = original.clone();
        let region = EmbeddingRegion::new(10, 12, 4, 3);
        coeffs
            .add_to_region(&region, &Array2::from_elem((3, 4), 0.5), 4.0)
            .unwrap();

        for ((row, col), value) in coeffs.as_array().indexed_iter() {
            let before = original.as_array()[[row, col]];
            if region.rows().contains(&row) && region.cols().contains(&col) {
                assert!((value - before - 2.0).abs() < 1e-12);
            } else {
                assert_eq!(*value, before);
            }
        }
    }

    #[test]
    fn test_to_intensity_saturates() {
        assert_eq!(to_intensity(-3.2), 0);
        assert_eq!(to_intensity(127.5), 128);
        assert_eq!(to_intensity(127.49), 127);
        assert_eq!(to_intensity(300.0), 255);
    }
}
