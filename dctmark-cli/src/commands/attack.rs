//! Attack command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use dctmark_core::{
    Attack, AttackKind, BlurParams, ContrastParams, CropParams, TranslateParams,
};
use tracing::info;

use crate::utils::{format_dimensions, load_image, save_image};
use crate::AttackArgs;

/// Build the attack of `kind`, filling unspecified parameters with defaults.
pub fn build_attack(kind: AttackKind, args: AttackArgs) -> Attack {
    match Attack::default_for(kind) {
        Attack::Mirror => Attack::Mirror,
        Attack::Translate(defaults) => Attack::Translate(TranslateParams {
            dx: args.dx.unwrap_or(defaults.dx),
            dy: args.dy.unwrap_or(defaults.dy),
        }),
        Attack::Crop(defaults) => Attack::Crop(
            args.margin
                .map(CropParams::uniform)
                .unwrap_or(defaults),
        ),
        Attack::Contrast(defaults) => Attack::Contrast(ContrastParams {
            factor: args.factor.unwrap_or(defaults.factor),
        }),
        Attack::Blur(defaults) => Attack::Blur(BlurParams {
            kernel_size: args.kernel_size.unwrap_or(defaults.kernel_size),
        }),
    }
}

/// Execute the attack command.
pub fn execute(
    image_path: PathBuf,
    kind: AttackKind,
    output: PathBuf,
    args: AttackArgs,
    quiet: bool,
) -> Result<()> {
    let attack = build_attack(kind, args);
    attack.validate().context("Invalid attack parameters")?;

    let image = load_image(&image_path)?;
    let attacked = attack
        .apply(&image)
        .with_context(|| format!("Failed to apply {attack}"))?;
    save_image(&attacked, &output)?;

    info!(attack = %attack, output = %output.display(), "Attack applied");

    if !quiet {
        println!("{} {}", "Applied".green().bold(), attack.to_string().bold());
        println!(
            "   {} {} -> {}",
            "Size:".dimmed(),
            format_dimensions(image.dimensions()),
            format_dimensions(attacked.dimensions())
        );
        println!("   {} {}", "Output:".dimmed(), output.display());
    }
    Ok(())
}
