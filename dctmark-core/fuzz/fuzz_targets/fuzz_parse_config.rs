#![no_main]

//! Fuzz target for the textual configuration inputs
//!
//! Exercises `EmbeddingRegion::from_str`, `parse_attack_list` and
//! `EvaluationConfig::from_json_str`. None of them may panic, including
//! `validate()` on any configuration that parses.
//!
//! Run with: cargo +nightly fuzz run fuzz_parse_config

use dctmark_core::attack::MAX_KERNEL_SIZE;
use dctmark_core::{parse_attack_list, Attack, EmbeddingRegion, EvaluationConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(region) = text.parse::<EmbeddingRegion>() {
        // Display output must parse back to the same region
        assert_eq!(region.to_string().parse::<EmbeddingRegion>().ok(), Some(region));
        let _ = region.min_extent();
    }

    let _ = parse_attack_list(text);

    if let Ok(config) = EvaluationConfig::from_json_str(text) {
        if config.validate().is_ok() {
            assert!(config.engine().is_ok());
            for attack in &config.attacks {
                if let Attack::Blur(params) = attack {
                    assert!(params.kernel_size <= MAX_KERNEL_SIZE);
                }
            }
        }
    }
});
