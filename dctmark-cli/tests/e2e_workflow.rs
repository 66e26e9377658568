//! End-to-end workflow tests for dctmark-cli.
//!
//! These tests verify complete user workflows involving multiple commands
//! and the files they exchange.

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use dctmark_core::metrics::{mean_absolute_error, normalized_correlation};
use dctmark_core::{load_grayscale, save_grayscale, GrayImage, Luma, WatermarkPattern};
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the dctmark binary.
fn dctmark() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("dctmark").into();
    cmd.env_remove("DCTMARK_STRENGTH")
        .env_remove("DCTMARK_REGION")
        .env_remove("DCTMARK_ATTACKS")
        .env_remove("RUST_LOG")
        .arg("--color=never");
    cmd
}

/// Smooth 256x256 host plus a 32x32 checkerboard, written as PNG.
fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let host = GrayImage::from_fn(256, 256, |x, y| {
        let (x, y) = (f64::from(x), f64::from(y));
        let value =
            110.0 + 50.0 * (2.0 * PI * x / 256.0).sin() * (2.0 * PI * y / 128.0).cos() + 0.1 * x;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });
    let host_path = dir.join("host.png");
    let mark_path = dir.join("mark.png");
    save_grayscale(&host, &host_path).unwrap();
    save_grayscale(WatermarkPattern::checkerboard(32, 32).as_image(), &mark_path).unwrap();
    (host_path, mark_path)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn correlation_with_mark(recovered: &Path, mark: &Path) -> f64 {
    normalized_correlation(
        &load_grayscale(recovered).unwrap(),
        &load_grayscale(mark).unwrap(),
    )
    .unwrap()
}

// ============================================================================
// Complete Workflow Tests: Embed → Attack → Extract
// ============================================================================

#[test]
fn test_e2e_embed_then_extract_recovers_watermark() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let watermarked = temp.path().join("watermarked.png");
    let recovered = temp.path().join("recovered.png");

    // Step 1: Embed
    dctmark()
        .args(["embed", path_str(&host), path_str(&mark), "-o", path_str(&watermarked)])
        .assert()
        .success();

    // Step 2: Extract and score against the original watermark
    dctmark()
        .args([
            "extract",
            path_str(&watermarked),
            path_str(&host),
            "-o",
            path_str(&recovered),
            "--reference",
            path_str(&mark),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Watermark extracted"))
        .stdout(predicate::str::contains("Correlation:"));

    let recovered_image = load_grayscale(&recovered).unwrap();
    assert_eq!(recovered_image.dimensions(), (32, 32));
    let mae = mean_absolute_error(&recovered_image, &load_grayscale(&mark).unwrap()).unwrap();
    assert!(mae < 5.0, "Recovered watermark MAE should be < 5 (got {:.2})", mae);
}

#[test]
fn test_e2e_contrast_survives_translate_does_not() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let watermarked = temp.path().join("watermarked.png");

    dctmark()
        .args(["embed", path_str(&host), path_str(&mark), "-o", path_str(&watermarked)])
        .assert()
        .success();

    let mut correlations = Vec::new();
    for kind in ["contrast", "translate"] {
        let attacked = temp.path().join(format!("{kind}.png"));
        let recovered = temp.path().join(format!("extracted_{kind}.png"));

        dctmark()
            .args(["attack", path_str(&watermarked), kind, "-o", path_str(&attacked)])
            .assert()
            .success();

        dctmark()
            .args([
                "extract",
                path_str(&attacked),
                path_str(&host),
                "-o",
                path_str(&recovered),
            ])
            .assert()
            .success();

        correlations.push(correlation_with_mark(&recovered, &mark));
    }

    assert!(correlations[0] > 0.7, "contrast: {:.3}", correlations[0]);
    assert!(correlations[1] < 0.4, "translate: {:.3}", correlations[1]);
}

#[test]
fn test_e2e_crop_needs_explicit_resize() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let watermarked = temp.path().join("watermarked.png");
    let cropped = temp.path().join("cropped.png");
    let recovered = temp.path().join("recovered.png");

    dctmark()
        .args(["embed", path_str(&host), path_str(&mark), "-o", path_str(&watermarked)])
        .assert()
        .success();

    dctmark()
        .args(["attack", path_str(&watermarked), "crop", "-o", path_str(&cropped)])
        .assert()
        .success();

    // Without --resize the size mismatch is reported
    dctmark()
        .args([
            "extract",
            path_str(&cropped),
            path_str(&host),
            "-o",
            path_str(&recovered),
        ])
        .assert()
        .code(65);
    assert!(!recovered.exists());

    // With --resize extraction runs, but the watermark is desynchronized
    dctmark()
        .args([
            "extract",
            "--resize",
            path_str(&cropped),
            path_str(&host),
            "-o",
            path_str(&recovered),
        ])
        .assert()
        .success();

    assert_eq!(load_grayscale(&recovered).unwrap().dimensions(), (32, 32));
    assert!(correlation_with_mark(&recovered, &mark) < 0.4);
}

// ============================================================================
// Evaluation Workflow Tests
// ============================================================================

#[test]
fn test_e2e_evaluate_writes_all_artifacts() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let out_dir = temp.path().join("report");

    dctmark()
        .args([
            "evaluate",
            path_str(&host),
            path_str(&mark),
            "-d",
            path_str(&out_dir),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Robustness evaluation"))
        .stdout(predicate::str::contains("crop(x=50, y=50) [resized]"))
        .stdout(predicate::str::contains("survived"))
        .stdout(predicate::str::contains("lost"));

    for name in ["watermarked", "extracted"] {
        assert!(out_dir.join(format!("{name}.png")).exists(), "{name}.png missing");
    }
    for kind in ["mirror", "translate", "crop", "contrast", "blur"] {
        assert!(out_dir.join(format!("{kind}.png")).exists(), "{kind}.png missing");
        assert!(
            out_dir.join(format!("extracted_{kind}.png")).exists(),
            "extracted_{kind}.png missing"
        );
    }

    // Attacked images are saved before any resize
    assert_eq!(
        load_grayscale(out_dir.join("crop.png")).unwrap().dimensions(),
        (156, 156)
    );
}

#[test]
fn test_e2e_evaluate_json_summary() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let out_dir = temp.path().join("report");

    let output = dctmark()
        .args([
            "evaluate",
            path_str(&host),
            path_str(&mark),
            "-d",
            path_str(&out_dir),
            "--attacks",
            "blur,crop",
            "--format",
            "json",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(summary["strength"], 10.0);
    assert_eq!(summary["region"]["x"], 100);
    let attacks = summary["attacks"].as_array().unwrap();
    assert_eq!(attacks.len(), 2);
    assert_eq!(attacks[0]["attack"]["kind"], "blur");
    assert_eq!(attacks[1]["attack"]["kind"], "crop");
    assert_eq!(attacks[1]["resized"], true);
    assert!(attacks[0]["score"]["correlation"].as_f64().unwrap() > 0.7);

    assert!(!out_dir.join("mirror.png").exists());
}

#[test]
fn test_e2e_evaluate_config_file_and_flag_precedence() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let out_dir = temp.path().join("report");
    let config = temp.path().join("dctmark.json");
    fs::write(
        &config,
        r#"{
            "strength": 20.0,
            "attacks": [
                {"kind": "contrast", "factor": 1.2},
                {"kind": "translate", "dx": 5, "dy": 0}
            ]
        }"#,
    )
    .unwrap();

    let output = dctmark()
        .env("DCTMARK_STRENGTH", "15")
        .args([
            "evaluate",
            path_str(&host),
            path_str(&mark),
            "-d",
            path_str(&out_dir),
            "--config",
            path_str(&config),
            "--region",
            "64,64,32,32",
            "--format",
            "json",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    // File sets 20, environment overrides to 15, the region comes from the flag
    assert_eq!(summary["strength"], 15.0);
    assert_eq!(summary["region"]["x"], 64);
    let attacks = summary["attacks"].as_array().unwrap();
    assert_eq!(attacks.len(), 2);
    assert_eq!(attacks[0]["attack"]["factor"], 1.2);
    assert_eq!(attacks[1]["attack"]["dx"], 5);
}

#[test]
fn test_e2e_quiet_evaluate_still_writes_files() {
    let temp = TempDir::new().unwrap();
    let (host, mark) = write_inputs(temp.path());
    let out_dir = temp.path().join("report");

    dctmark()
        .args([
            "-q",
            "evaluate",
            path_str(&host),
            path_str(&mark),
            "-d",
            path_str(&out_dir),
            "-a",
            "mirror",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(out_dir.join("watermarked.png").exists());
    assert!(out_dir.join("extracted_mirror.png").exists());
}
