//! Embed command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use dctmark_core::metrics::psnr;
use tracing::info;

use crate::utils::{format_dimensions, format_psnr, load_image, resolve_config, save_image};
use crate::EmbeddingArgs;

/// Execute the embed command.
pub fn execute(
    host_path: PathBuf,
    watermark_path: PathBuf,
    output: PathBuf,
    embedding: EmbeddingArgs,
    quiet: bool,
) -> Result<()> {
    let config = resolve_config(None, embedding)?;
    let engine = config.engine()?;

    let host = load_image(&host_path)?;
    let watermark = engine.fit_pattern(&load_image(&watermark_path)?)?;

    let watermarked = engine
        .embed(&host, &watermark)
        .context("Failed to embed watermark")?;
    save_image(&watermarked, &output)?;

    let quality = psnr(&watermarked, &host)?;
    info!(
        output = %output.display(),
        strength = engine.strength(),
        region = %engine.region(),
        psnr = quality,
        "Watermark embedded"
    );

    if !quiet {
        println!("{}", "Watermark embedded".green().bold());
        println!(
            "   {} {} ({})",
            "Host:".dimmed(),
            host_path.display(),
            format_dimensions(host.dimensions())
        );
        println!("   {} {}", "Watermark:".dimmed(), watermark_path.display());
        println!("   {} {}", "Region:".dimmed(), engine.region());
        println!("   {} {}", "Strength:".dimmed(), engine.strength());
        println!(
            "   {} {}",
            "PSNR vs host:".dimmed(),
            format_psnr(quality.is_finite().then_some(quality))
        );
        println!("   {} {}", "Output:".dimmed(), output.display());
    }
    Ok(())
}
