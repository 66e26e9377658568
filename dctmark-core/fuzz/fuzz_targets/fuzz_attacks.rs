#![no_main]

//! Fuzz target for the attack suite on arbitrary small images
//!
//! The first two bytes pick the image size (up to 32x32), the next four pick
//! attack parameters and the rest fill the pixels. Every attack with valid
//! parameters must succeed, and crop must either succeed with the expected
//! size or report a shape error.
//!
//! Run with: cargo +nightly fuzz run fuzz_attacks

use dctmark_core::{
    codec, Attack, BlurParams, ContrastParams, CropParams, GrayImage, TranslateParams,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [w, h, a, b, c, d, pixels @ ..] = data else {
        return;
    };
    let (width, height) = (u32::from(w % 33), u32::from(h % 33));
    let mut raw = vec![0u8; (width * height) as usize];
    for (dst, src) in raw.iter_mut().zip(pixels.iter().cycle()) {
        *dst = *src;
    }
    let Some(image) = GrayImage::from_raw(width, height, raw) else {
        return;
    };

    let attacks = [
        Attack::Mirror,
        Attack::Translate(TranslateParams {
            dx: i32::from(*a as i8),
            dy: i32::from(*b as i8),
        }),
        Attack::Contrast(ContrastParams {
            factor: f64::from(*c) / 64.0,
        }),
        Attack::Blur(BlurParams {
            kernel_size: 3 + 2 * u32::from(d % 8),
        }),
    ];
    for attack in attacks {
        let attacked = attack.apply(&image).expect("valid attack failed");
        assert_eq!(attacked.dimensions(), image.dimensions());
    }

    let crop = CropParams {
        margin_x: u32::from(a % 20),
        margin_y: u32::from(b % 20),
    };
    if let Ok(cropped) = Attack::Crop(crop).apply(&image) {
        assert_eq!(
            cropped.dimensions(),
            (width - 2 * crop.margin_x, height - 2 * crop.margin_y)
        );
    }

    let restored = codec::inverse(&codec::forward(&image));
    assert_eq!(restored.dimensions(), image.dimensions());
});
