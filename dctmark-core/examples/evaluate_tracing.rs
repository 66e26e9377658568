//! Example demonstrating the evaluation driver's tracing instrumentation.
//!
//! Run with: cargo run -p dctmark-core --example evaluate_tracing

use dctmark_core::{evaluate, EvaluationConfig, GrayImage, Luma, WatermarkPattern};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Initialize tracing subscriber with debug level
    fmt()
        .with_env_filter(EnvFilter::new("dctmark_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== DCTMark Evaluation Tracing Demo ===\n");

    let host = GrayImage::from_fn(256, 256, |x, y| Luma([(96 + (x / 4 + y / 2) % 64) as u8]));
    let watermark = WatermarkPattern::checkerboard(32, 32);
    let config = EvaluationConfig::default().apply_env();

    println!("Config: {:?}\n", config);

    let report = match evaluate(&host, watermark.as_image(), &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Evaluation failed: {}", e);
            return;
        }
    };

    println!("\nBaseline MAE: {:.2}", report.baseline.mae);
    for outcome in &report.outcomes {
        println!(
            "   {:<28} MAE {:>6.2}  NC {:>6.3}",
            outcome.attack.to_string(),
            outcome.score.mae,
            outcome.score.correlation
        );
    }
}
