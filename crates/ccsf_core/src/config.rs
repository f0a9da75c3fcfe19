//! Engine configuration
//!
//! Every constant the patch engine and the standings calculator depend on
//! lives here so that a save can be replayed under a different rule set
//! without touching code.
//!
//! ## Environment Variables
//!
//! - `CCSF_ENGINE_CONFIG`: path to a YAML (or JSON) file with an `EngineConfig`

use crate::error::{CoreError, Result};
use crate::state::Timeline;
use serde::{Deserialize, Serialize};
use std::{env, fs};

pub const ENGINE_CONFIG_PATH_ENV: &str = "CCSF_ENGINE_CONFIG";

/// Standard top-10 points table.
pub const DEFAULT_POINTS: [f64; 10] = [25.0, 18.0, 15.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0, 1.0];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Only batches tagged with this kind are applied
    pub patch_kind: String,
    /// Path segment marking a vehicle attribute subtree
    pub vehicle_marker: String,
    pub attribute_min: f64,
    pub attribute_max: f64,
    /// Points by finishing position, index 0 = winner
    pub default_points: Vec<f64>,
    /// Scaffolding written into documents that lack it
    pub new_game: NewGameDefaults,
    /// Standings bucket for finishers without any team
    pub unattached_team: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewGameDefaults {
    pub season: i64,
    pub timeline: Timeline,
    pub last_completed_round: u32,
}

impl Default for NewGameDefaults {
    fn default() -> Self {
        Self { season: 2025, timeline: Timeline::Preseason, last_completed_round: 0 }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            patch_kind: "patch-v1".to_string(),
            vehicle_marker: "car".to_string(),
            attribute_min: 0.0,
            attribute_max: 100.0,
            default_points: DEFAULT_POINTS.to_vec(),
            new_game: NewGameDefaults::default(),
            unattached_team: "—".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse YAML. JSON is a subset, so JSON config files work too.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `CCSF_ENGINE_CONFIG` when set, defaults otherwise.
    pub fn from_env_or_default() -> Result<Self> {
        let Ok(path) = env::var(ENGINE_CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        log::info!("Loaded engine config from {ENGINE_CONFIG_PATH_ENV}='{path}'");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.patch_kind.trim().is_empty() {
            return Err(CoreError::InvalidConfig("patch_kind must not be empty".into()));
        }
        if self.vehicle_marker.trim().is_empty() {
            return Err(CoreError::InvalidConfig("vehicle_marker must not be empty".into()));
        }
        if !(self.attribute_min <= self.attribute_max) {
            return Err(CoreError::InvalidConfig(format!(
                "attribute range is empty: [{}, {}]",
                self.attribute_min, self.attribute_max
            )));
        }
        if self.default_points.iter().any(|p| !p.is_finite()) {
            return Err(CoreError::InvalidConfig("default_points must be finite".into()));
        }
        Ok(())
    }
}
