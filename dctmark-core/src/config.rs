//! Evaluation configuration.
//!
//! Defaults match the reference setup: strength 10, a 32x32 region at
//! (100, 100) and all five attacks with their default parameters. A JSON
//! file can replace any subset of fields, and a few environment variables
//! override the result.
//!
//! | Variable           | Format                         |
//! |--------------------|--------------------------------|
//! | `DCTMARK_STRENGTH` | float                          |
//! | `DCTMARK_REGION`   | `x,y,width,height`             |
//! | `DCTMARK_ATTACKS`  | comma list, e.g. `crop,blur`   |

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::attack::{Attack, AttackKind};
use crate::error::{Result, WatermarkError};
use crate::region::{EmbeddingRegion, DEFAULT_REGION};
use crate::watermark::{WatermarkEngine, DEFAULT_STRENGTH};

pub const ENV_STRENGTH: &str = "DCTMARK_STRENGTH";
pub const ENV_REGION: &str = "DCTMARK_REGION";
pub const ENV_ATTACKS: &str = "DCTMARK_ATTACKS";

/// Settings for one embed → attack → extract evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub strength: f64,
    pub region: EmbeddingRegion,
    /// Attacks to run, in order.
    pub attacks: Vec<Attack>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            region: DEFAULT_REGION,
            attacks: AttackKind::ALL.into_iter().map(Attack::default_for).collect(),
        }
    }
}

impl EvaluationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| WatermarkError::Config(format!("Invalid configuration: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            WatermarkError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Values that fail to parse are skipped
    /// with a warning.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_STRENGTH) {
            match value.trim().parse::<f64>() {
                Ok(strength) => self.strength = strength,
                Err(e) => warn!(var = ENV_STRENGTH, value = %value, error = %e, "Ignoring override"),
            }
        }

        if let Some(value) = lookup(ENV_REGION) {
            match value.parse::<EmbeddingRegion>() {
                Ok(region) => self.region = region,
                Err(e) => warn!(var = ENV_REGION, value = %value, error = %e, "Ignoring override"),
            }
        }

        if let Some(value) = lookup(ENV_ATTACKS) {
            match parse_attack_list(&value) {
                Ok(kinds) => self = self.with_attack_kinds(&kinds),
                Err(e) => warn!(var = ENV_ATTACKS, value = %value, error = %e, "Ignoring override"),
            }
        }

        self
    }

    /// Restrict the attack list to `kinds`, in the given order.
    ///
    /// Kinds already configured keep their parameters; new ones get defaults.
    /// Repeated kinds are kept once.
    pub fn with_attack_kinds(mut self, kinds: &[AttackKind]) -> Self {
        let mut selected: Vec<Attack> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if selected.iter().any(|a| a.kind() == *kind) {
                continue;
            }
            let attack = self
                .attacks
                .iter()
                .find(|a| a.kind() == *kind)
                .copied()
                .unwrap_or_else(|| Attack::default_for(*kind));
            selected.push(attack);
        }
        self.attacks = selected;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.engine()?;
        for attack in &self.attacks {
            attack.validate()?;
        }
        Ok(())
    }

    /// Engine configured with this region and strength.
    pub fn engine(&self) -> Result<WatermarkEngine> {
        WatermarkEngine::new(self.region, self.strength)
    }
}

/// Parse a comma-separated list of attack kinds. Empty entries are skipped.
pub fn parse_attack_list(list: &str) -> Result<Vec<AttackKind>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
