//! Robustness evaluation: embed once, attack, extract, score.
//!
//! For every configured attack the driver:
//!
//! 1. applies the attack to the watermarked image;
//! 2. resizes the result back to the host size if the attack changed it
//!    (logged, and flagged in the outcome);
//! 3. extracts against the untouched host;
//! 4. scores the recovered pattern against the embedded one.

use image::imageops::{self, FilterType};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attack::{Attack, AttackKind};
use crate::config::EvaluationConfig;
use crate::error::Result;
use crate::metrics::ExtractionScore;
use crate::region::EmbeddingRegion;
use crate::watermark::WatermarkPattern;

/// Resize `image` to `dimensions` (`(width, height)`) with a triangle filter.
///
/// This is the explicit realignment step callers run before extracting from
/// an image whose size no longer matches the original.
pub fn restore_dimensions(image: &GrayImage, dimensions: (u32, u32)) -> GrayImage {
    if image.dimensions() == dimensions {
        return image.clone();
    }
    debug!(
        from = ?image.dimensions(),
        to = ?dimensions,
        "Resizing attacked image to original dimensions"
    );
    imageops::resize(image, dimensions.0, dimensions.1, FilterType::Triangle)
}

/// Result of one attack.
#[derive(Debug, Clone)]
pub struct AttackOutcome {
    pub attack: Attack,
    /// Attack output, before any resize.
    pub attacked: GrayImage,
    /// Whether the attacked image had to be resized before extraction.
    pub resized: bool,
    pub recovered: WatermarkPattern,
    pub score: ExtractionScore,
}

/// Everything produced by [`evaluate`].
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub strength: f64,
    pub region: EmbeddingRegion,
    pub watermarked: GrayImage,
    pub embedded: WatermarkPattern,
    /// Extraction from the unattacked watermarked image.
    pub baseline_recovered: WatermarkPattern,
    pub baseline: ExtractionScore,
    pub outcomes: Vec<AttackOutcome>,
}

impl EvaluationReport {
    pub fn outcome(&self, kind: AttackKind) -> Option<&AttackOutcome> {
        self.outcomes.iter().find(|o| o.attack.kind() == kind)
    }

    /// Serializable view without image data.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            strength: self.strength,
            region: self.region,
            baseline: self.baseline,
            attacks: self
                .outcomes
                .iter()
                .map(|o| AttackSummary {
                    attack: o.attack,
                    resized: o.resized,
                    score: o.score,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub strength: f64,
    pub region: EmbeddingRegion,
    pub baseline: ExtractionScore,
    pub attacks: Vec<AttackSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSummary {
    pub attack: Attack,
    pub resized: bool,
    pub score: ExtractionScore,
}

/// Run the full embed → attack → extract pipeline on `host`.
///
/// `watermark` is resized to the configured region if needed.
pub fn evaluate(
    host: &GrayImage,
    watermark: &GrayImage,
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    config.validate()?;
    let engine = config.engine()?;
    let embedded = engine.fit_pattern(watermark)?;

    let watermarked = engine.embed(host, &embedded)?;
    let baseline_recovered = engine.extract(&watermarked, host)?;
    let baseline = ExtractionScore::compare(baseline_recovered.as_image(), embedded.as_image())?;
    info!(
        mae = baseline.mae,
        correlation = baseline.correlation,
        "Baseline extraction"
    );

    let mut outcomes = Vec::with_capacity(config.attacks.len());
    for attack in &config.attacks {
        let attacked = attack.apply(&watermarked)?;
        let resized = attacked.dimensions() != host.dimensions();
        let aligned = restore_dimensions(&attacked, host.dimensions());

        let recovered = engine.extract(&aligned, host)?;
        let score = ExtractionScore::compare(recovered.as_image(), embedded.as_image())?;
        info!(
            attack = %attack,
            resized,
            mae = score.mae,
            correlation = score.correlation,
            "Attack evaluated"
        );

        outcomes.push(AttackOutcome {
            attack: *attack,
            attacked,
            resized,
            recovered,
            score,
        });
    }

    Ok(EvaluationReport {
        strength: engine.strength(),
        region: engine.region(),
        watermarked,
        embedded,
        baseline_recovered,
        baseline,
        outcomes,
    })
}
