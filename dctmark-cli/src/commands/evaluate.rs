//! Evaluate command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use dctmark_core::{evaluate, parse_attack_list, EvaluationReport, ExtractionScore};
use tracing::info;

use crate::utils::{
    artifact_path, format_dimensions, format_psnr, load_image, resolve_config, save_image,
};
use crate::{EmbeddingArgs, OutputFormat};

/// Correlation above which the report marks a recovery as surviving.
const SURVIVED_CORRELATION: f64 = 0.7;

/// Correlation below which the report marks a recovery as lost.
const LOST_CORRELATION: f64 = 0.4;

/// Inputs and output switches for one evaluation run.
pub struct EvaluateOptions {
    pub host: PathBuf,
    pub watermark: PathBuf,
    pub output_dir: PathBuf,
    pub attacks: Option<String>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Execute the evaluate command.
pub fn execute(options: EvaluateOptions, embedding: EmbeddingArgs, quiet: bool) -> Result<()> {
    let mut config = resolve_config(options.config.as_deref(), embedding)?;
    if let Some(list) = &options.attacks {
        let kinds = parse_attack_list(list).context("Invalid --attacks list")?;
        config = config.with_attack_kinds(&kinds);
    }

    let host = load_image(&options.host)?;
    let watermark = load_image(&options.watermark)?;

    let report = evaluate(&host, &watermark, &config).context("Evaluation failed")?;
    write_artifacts(&report, &options.output_dir)?;

    info!(
        attacks = report.outcomes.len(),
        output_dir = %options.output_dir.display(),
        "Evaluation complete"
    );

    if quiet {
        return Ok(());
    }
    match options.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report.summary())
                .context("Failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Text => print_report(&report, &options),
    }
    Ok(())
}

/// Save the watermarked image plus every attacked image and recovery.
fn write_artifacts(report: &EvaluationReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to write output directory: {}", dir.display()))?;

    save_image(&report.watermarked, &artifact_path(dir, "watermarked"))?;
    save_image(
        report.baseline_recovered.as_image(),
        &artifact_path(dir, "extracted"),
    )?;
    for outcome in &report.outcomes {
        let name = outcome.attack.kind().name();
        save_image(&outcome.attacked, &artifact_path(dir, name))?;
        save_image(
            outcome.recovered.as_image(),
            &artifact_path(dir, &format!("extracted_{name}")),
        )?;
    }
    Ok(())
}

fn verdict(score: &ExtractionScore) -> ColoredString {
    if score.correlation > SURVIVED_CORRELATION {
        "survived".green()
    } else if score.correlation < LOST_CORRELATION {
        "lost".red()
    } else {
        "degraded".yellow()
    }
}

fn print_report(report: &EvaluationReport, options: &EvaluateOptions) {
    println!("{}", "Robustness evaluation".bold());
    println!(
        "   {} {} ({})",
        "Host:".dimmed(),
        options.host.display(),
        format_dimensions(report.watermarked.dimensions())
    );
    println!("   {} {}", "Watermark:".dimmed(), options.watermark.display());
    println!("   {} {}", "Region:".dimmed(), report.region);
    println!("   {} {}", "Strength:".dimmed(), report.strength);
    println!();

    println!(
        "   {:<28} {:>8} {:>10} {:>8} {:>8}  {}",
        "Attack", "MAE", "PSNR", "NC", "Bits", "Verdict"
    );
    print_row("none", &report.baseline, false);
    for outcome in &report.outcomes {
        print_row(&outcome.attack.to_string(), &outcome.score, outcome.resized);
    }

    println!();
    println!("   {} {}", "Images:".dimmed(), options.output_dir.display());
}

fn print_row(label: &str, score: &ExtractionScore, resized: bool) {
    let label = if resized {
        format!("{label} [resized]")
    } else {
        label.to_string()
    };
    println!(
        "   {:<28} {:>8.2} {:>10} {:>8.3} {:>7.1}%  {}",
        label,
        score.mae,
        format_psnr(score.psnr),
        score.correlation,
        score.bit_match * 100.0,
        verdict(score)
    );
}
