//! Geometric attacks: mirror, translate, crop.
//!
//! These move pixels without changing their values. All of them break the
//! positional alignment that extraction relies on.

use image::imageops;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatermarkError};

/// Intensity written into pixels vacated by a translation.
pub const TRANSLATE_FILL: u8 = 0;

/// Content shift in pixels. Positive `dx` moves right, positive `dy` down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslateParams {
    pub dx: i32,
    pub dy: i32,
}

impl Default for TranslateParams {
    fn default() -> Self {
        Self { dx: 20, dy: 10 }
    }
}

/// Margins removed from each side: `margin_x` from left and right,
/// `margin_y` from top and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropParams {
    pub margin_x: u32,
    pub margin_y: u32,
}

impl CropParams {
    pub const fn uniform(margin: u32) -> Self {
        Self {
            margin_x: margin,
            margin_y: margin,
        }
    }
}

impl Default for CropParams {
    fn default() -> Self {
        Self::uniform(50)
    }
}

/// Horizontal flip.
pub fn mirror(image: &GrayImage) -> GrayImage {
    imageops::flip_horizontal(image)
}

/// Shift content by `(dx, dy)`. Pixels leaving the frame are dropped and the
/// uncovered area is filled with [`TRANSLATE_FILL`].
pub fn translate(image: &GrayImage, params: TranslateParams) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let src_x = i64::from(x) - i64::from(params.dx);
        let src_y = i64::from(y) - i64::from(params.dy);
        if (0..i64::from(width)).contains(&src_x) && (0..i64::from(height)).contains(&src_y) {
            *image.get_pixel(src_x as u32, src_y as u32)
        } else {
            Luma([TRANSLATE_FILL])
        }
    })
}

/// Remove the margins from all four sides.
///
/// Output is `(width - 2 * margin_x, height - 2 * margin_y)`.
///
/// # Errors
///
/// [`WatermarkError::Shape`] when the margins would leave no pixels.
pub fn crop(image: &GrayImage, params: CropParams) -> Result<GrayImage> {
    let (width, height) = image.dimensions();
    let removed_x = params.margin_x.checked_mul(2);
    let removed_y = params.margin_y.checked_mul(2);

    match (removed_x, removed_y) {
        (Some(rx), Some(ry)) if rx < width && ry < height => Ok(imageops::crop_imm(
            image,
            params.margin_x,
            params.margin_y,
            width - rx,
            height - ry,
        )
        .to_image()),
        _ => Err(WatermarkError::Shape {
            context: "crop margins vs image",
            expected: (
                params.margin_x.saturating_mul(2).saturating_add(1),
                params.margin_y.saturating_mul(2).saturating_add(1),
            ),
            actual: (width, height),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([(y * width + x) as u8]))
    }

    #[test]
    fn test_mirror_flips_rows() {
        let image = numbered(4, 2);
        let flipped = mirror(&image);
        assert_eq!(flipped.dimensions(), (4, 2));
        assert_eq!(flipped.get_pixel(0, 0), image.get_pixel(3, 0));
        assert_eq!(flipped.get_pixel(3, 1), image.get_pixel(0, 1));
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        let image = numbered(7, 5);
        assert_eq!(mirror(&mirror(&image)), image);
    }

    #[test]
    fn test_translate_moves_content_and_fills() {
        let image = numbered(6, 6);
        let shifted = translate(&image, TranslateParams { dx: 2, dy: 1 });
        assert_eq!(shifted.dimensions(), (6, 6));
        assert_eq!(shifted.get_pixel(2, 1), image.get_pixel(0, 0));
        assert_eq!(shifted.get_pixel(5, 5), image.get_pixel(3, 4));
        assert_eq!(shifted.get_pixel(0, 3)[0], TRANSLATE_FILL);
        assert_eq!(shifted.get_pixel(4, 0)[0], TRANSLATE_FILL);
    }

    #[test]
    fn test_translate_negative_offsets() {
        let image = numbered(6, 6);
        let shifted = translate(&image, TranslateParams { dx: -2, dy: -3 });
        assert_eq!(shifted.get_pixel(0, 0), image.get_pixel(2, 3));
        assert_eq!(shifted.get_pixel(5, 0)[0], TRANSLATE_FILL);
        assert_eq!(shifted.get_pixel(0, 5)[0], TRANSLATE_FILL);
    }

    #[test]
    fn test_translate_beyond_frame_is_blank() {
        let image = numbered(6, 6);
        let shifted = translate(&image, TranslateParams { dx: 10, dy: 0 });
        assert!(shifted.pixels().all(|p| p[0] == TRANSLATE_FILL));
    }

    #[test]
    fn test_crop_dimensions() {
        let image = numbered(16, 12);
        let cropped = crop(&image, CropParams { margin_x: 3, margin_y: 2 }).unwrap();
        assert_eq!(cropped.dimensions(), (10, 8));
        assert_eq!(cropped.get_pixel(0, 0), image.get_pixel(3, 2));
    }

    #[test]
    fn test_crop_rejects_oversized_margin() {
        let image = numbered(16, 16);
        assert!(matches!(
            crop(&image, CropParams::uniform(8)),
            Err(WatermarkError::Shape { .. })
        ));
        assert!(crop(&image, CropParams::uniform(u32::MAX)).is_err());
        assert_eq!(
            crop(&image, CropParams::uniform(7)).unwrap().dimensions(),
            (2, 2)
        );
    }
}
