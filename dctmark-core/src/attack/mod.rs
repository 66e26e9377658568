//! Attack suite used to stress watermark extraction.
//!
//! Each attack is a deterministic, pure transform of a grayscale image. None
//! of them knows where the watermark lives.
//!
//! # Attacks
//!
//! | Kind        | Effect                                   | Dimensions        |
//! |-------------|------------------------------------------|-------------------|
//! | `mirror`    | horizontal flip                          | preserved         |
//! | `translate` | shift by `(dx, dy)`, vacated pixels = 0  | preserved         |
//! | `crop`      | remove margins from all four sides       | shrink by 2×margin|
//! | `contrast`  | multiply intensities, clamp to [0, 255]  | preserved         |
//! | `blur`      | separable Gaussian, mirrored edges       | preserved         |

pub mod geometric;
pub mod photometric;

use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WatermarkError};

pub use geometric::{CropParams, TranslateParams, TRANSLATE_FILL};
pub use photometric::{BlurParams, ContrastParams, MAX_KERNEL_SIZE};

/// Attack selector without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Mirror,
    Translate,
    Crop,
    Contrast,
    Blur,
}

impl AttackKind {
    /// Every attack, in evaluation order.
    pub const ALL: [AttackKind; 5] = [
        AttackKind::Mirror,
        AttackKind::Translate,
        AttackKind::Crop,
        AttackKind::Contrast,
        AttackKind::Blur,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AttackKind::Mirror => "mirror",
            AttackKind::Translate => "translate",
            AttackKind::Crop => "crop",
            AttackKind::Contrast => "contrast",
            AttackKind::Blur => "blur",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttackKind {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        AttackKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                WatermarkError::InvalidParameter(format!(
                    "unknown attack '{s}' (expected one of: mirror, translate, crop, contrast, blur)"
                ))
            })
    }
}

/// An attack together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Attack {
    Mirror,
    Translate(TranslateParams),
    Crop(CropParams),
    Contrast(ContrastParams),
    Blur(BlurParams),
}

impl Attack {
    /// The attack of `kind` with its default parameters.
    pub fn default_for(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Mirror => Attack::Mirror,
            AttackKind::Translate => Attack::Translate(TranslateParams::default()),
            AttackKind::Crop => Attack::Crop(CropParams::default()),
            AttackKind::Contrast => Attack::Contrast(ContrastParams::default()),
            AttackKind::Blur => Attack::Blur(BlurParams::default()),
        }
    }

    pub fn kind(&self) -> AttackKind {
        match self {
            Attack::Mirror => AttackKind::Mirror,
            Attack::Translate(_) => AttackKind::Translate,
            Attack::Crop(_) => AttackKind::Crop,
            Attack::Contrast(_) => AttackKind::Contrast,
            Attack::Blur(_) => AttackKind::Blur,
        }
    }

    /// Whether the output always has the input's dimensions.
    pub fn preserves_dimensions(&self) -> bool {
        !matches!(self, Attack::Crop(_))
    }

    /// Check the parameters without running the attack.
    pub fn validate(&self) -> Result<()> {
        match self {
            Attack::Contrast(params) => photometric::validate_contrast(*params),
            Attack::Blur(params) => photometric::validate_blur(*params),
            Attack::Mirror | Attack::Translate(_) | Attack::Crop(_) => Ok(()),
        }
    }

    pub fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        let attacked = match self {
            Attack::Mirror => geometric::mirror(image),
            Attack::Translate(params) => geometric::translate(image, *params),
            Attack::Crop(params) => geometric::crop(image, *params)?,
            Attack::Contrast(params) => photometric::contrast(image, *params)?,
            Attack::Blur(params) => photometric::gaussian_blur(image, *params)?,
        };

        debug!(
            attack = %self,
            input = ?image.dimensions(),
            output = ?attacked.dimensions(),
            "Applied attack"
        );
        Ok(attacked)
    }
}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attack::Mirror => write!(f, "mirror"),
            Attack::Translate(p) => write!(f, "translate(dx={}, dy={})", p.dx, p.dy),
            Attack::Crop(p) => write!(f, "crop(x={}, y={})", p.margin_x, p.margin_y),
            Attack::Contrast(p) => write!(f, "contrast(factor={})", p.factor),
            Attack::Blur(p) => write!(f, "blur(ksize={})", p.kernel_size),
        }
    }
}
