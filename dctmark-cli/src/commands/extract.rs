//! Extract command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use dctmark_core::{restore_dimensions, ExtractionScore, WatermarkPattern};
use tracing::{info, warn};

use crate::utils::{format_dimensions, format_psnr, load_image, resolve_config, save_image};
use crate::EmbeddingArgs;

/// Paths and switches for one extraction.
pub struct ExtractOptions {
    pub image: PathBuf,
    pub original: PathBuf,
    pub output: PathBuf,
    pub resize: bool,
    pub reference: Option<PathBuf>,
}

/// Execute the extract command.
pub fn execute(options: ExtractOptions, embedding: EmbeddingArgs, quiet: bool) -> Result<()> {
    let config = resolve_config(None, embedding)?;
    let engine = config.engine()?;

    let original = load_image(&options.original)?;
    let mut image = load_image(&options.image)?;

    if options.resize && image.dimensions() != original.dimensions() {
        warn!(
            from = %format_dimensions(image.dimensions()),
            to = %format_dimensions(original.dimensions()),
            "Resizing image to the original's dimensions before extraction"
        );
        image = restore_dimensions(&image, original.dimensions());
    }

    let recovered = engine
        .extract(&image, &original)
        .context("Failed to extract watermark")?;
    save_image(recovered.as_image(), &options.output)?;
    info!(output = %options.output.display(), "Watermark extracted");

    let score = match &options.reference {
        Some(path) => {
            let reference = WatermarkPattern::fit(&load_image(path)?, recovered.dimensions())?;
            Some(ExtractionScore::compare(
                recovered.as_image(),
                reference.as_image(),
            )?)
        }
        None => None,
    };

    if !quiet {
        println!("{}", "Watermark extracted".green().bold());
        println!("   {} {}", "Image:".dimmed(), options.image.display());
        println!("   {} {}", "Original:".dimmed(), options.original.display());
        println!("   {} {}", "Region:".dimmed(), engine.region());
        println!("   {} {}", "Strength:".dimmed(), engine.strength());
        println!("   {} {}", "Output:".dimmed(), options.output.display());

        if let Some(score) = score {
            println!();
            println!("   {} {:.2}", "MAE:".dimmed(), score.mae);
            println!("   {} {}", "PSNR:".dimmed(), format_psnr(score.psnr));
            println!("   {} {:.3}", "Correlation:".dimmed(), score.correlation);
            println!("   {} {:.1}%", "Bit match:".dimmed(), score.bit_match * 100.0);
        }
    }
    Ok(())
}
