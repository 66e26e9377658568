//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dctmark_core::{EvaluationConfig, GrayImage};
use tracing::{debug, info};

use crate::EmbeddingArgs;

/// Load an image as 8-bit grayscale.
pub fn load_image(path: &Path) -> Result<GrayImage> {
    let image = dctmark_core::load_grayscale(path)
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    info!(path = %path.display(), width = image.width(), height = image.height(), "Read image");
    Ok(image)
}

/// Save an image, format chosen by extension.
pub fn save_image(image: &GrayImage, path: &Path) -> Result<()> {
    dctmark_core::save_grayscale(image, path)
        .with_context(|| format!("Failed to write image: {}", path.display()))?;
    info!(path = %path.display(), "Wrote image");
    Ok(())
}

/// Build the effective configuration.
///
/// Precedence, lowest first: built-in defaults, config file, environment,
/// command-line flags.
pub fn resolve_config(config_file: Option<&Path>, flags: EmbeddingArgs) -> Result<EvaluationConfig> {
    resolve_config_with(config_file, flags, |key| std::env::var(key).ok())
}

/// [`resolve_config`] with environment variables read through `lookup`.
pub fn resolve_config_with(
    config_file: Option<&Path>,
    flags: EmbeddingArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<EvaluationConfig> {
    let config = match config_file {
        Some(path) => {
            debug!(path = %path.display(), "Loading config file");
            EvaluationConfig::from_json_file(path)?
        }
        None => EvaluationConfig::default(),
    };

    let mut config = config.apply_env_with(lookup);
    if let Some(strength) = flags.strength {
        config.strength = strength;
    }
    if let Some(region) = flags.region {
        config.region = region;
    }

    config.validate().context("Invalid configuration")?;
    debug!(strength = config.strength, region = %config.region, "Resolved configuration");
    Ok(config)
}

/// Output path for an image inside the evaluation output directory.
pub fn artifact_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.png"))
}

/// Format `(width, height)` as `WxH`.
pub fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{width}x{height}")
}

/// Format a PSNR value, which is `None` for a perfect match.
pub fn format_psnr(psnr: Option<f64>) -> String {
    match psnr {
        Some(db) => format!("{db:.2} dB"),
        None => "inf".to_string(),
    }
}
