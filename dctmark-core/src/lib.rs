//! DCTMark Core - frequency-domain image watermarking library
//!
//! This crate hides a small grayscale pattern in a block of an image's 2D DCT
//! coefficients and recovers it later by comparing against the original.
//! It also ships the attack suite used to measure how well the pattern
//! survives common edits.
//!
//! # Features
//!
//! - Orthonormal 2D DCT-II / DCT-III on grayscale grids
//! - Additive, non-blind embedding in a configurable coefficient region
//! - Five deterministic attacks: mirror, translate, crop, contrast, blur
//! - Extraction scores (MAE, PSNR, normalized correlation, bit match)
//! - Evaluation driver with JSON/env configuration
//! - File I/O for common formats (`io` feature, on by default)
//!
//! # Example
//!
//! ```
//! use dctmark_core::{evaluate, AttackKind, EvaluationConfig, GrayImage, Luma, WatermarkPattern};
//!
//! # fn example() -> dctmark_core::Result<()> {
//! let host = GrayImage::from_fn(256, 256, |x, y| Luma([(64 + (x + y) % 128) as u8]));
//! let watermark = WatermarkPattern::checkerboard(32, 32);
//!
//! let config = EvaluationConfig::default()
//!     .with_attack_kinds(&[AttackKind::Contrast, AttackKind::Crop]);
//! let report = evaluate(&host, watermark.as_image(), &config)?;
//!
//! for outcome in &report.outcomes {
//!     println!("{}: MAE {:.1}", outcome.attack, outcome.score.mae);
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod attack;
pub mod codec;
pub mod config;
pub mod error;
pub mod evaluate;
#[cfg(feature = "io")]
pub mod io;
pub mod metrics;
pub mod region;
pub mod watermark;

// Re-export main types for convenience
pub use image::{GrayImage, Luma};

pub use attack::{Attack, AttackKind, BlurParams, ContrastParams, CropParams, TranslateParams};
pub use codec::CoefficientGrid;
pub use config::{parse_attack_list, EvaluationConfig};
pub use error::{Result, WatermarkError};
pub use evaluate::{evaluate, restore_dimensions, AttackOutcome, EvaluationReport, ReportSummary};
pub use metrics::ExtractionScore;
pub use region::{EmbeddingRegion, DEFAULT_REGION};
pub use watermark::{embed, extract, WatermarkEngine, WatermarkPattern, DEFAULT_STRENGTH};

#[cfg(feature = "io")]
pub use io::{load_grayscale, load_watermark, save_grayscale};
