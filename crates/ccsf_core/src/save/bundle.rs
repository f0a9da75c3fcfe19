//! Single-file player bundle (`ccsf_bundle_v1`).

use super::error::SaveError;
use super::integrity::validate_state;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::Write;

pub const BUNDLE_TYPE: &str = "ccsf_bundle_v1";
pub const BUNDLE_VERSION: &str = "2025.0.1";

/// Bundle module name → document section. Only `metadata` is renamed.
pub const MODULE_SECTIONS: [(&str, &str); 11] = [
    ("metadata", "meta"),
    ("regulations", "regulations"),
    ("sponsors", "sponsors"),
    ("teams", "teams"),
    ("drivers", "drivers"),
    ("principals", "principals"),
    ("engineers", "engineers"),
    ("calendar", "calendar"),
    ("development", "development"),
    ("rumours", "rumours"),
    ("stats", "stats"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub version: String,
    #[serde(default)]
    pub season: Option<i64>,
    #[serde(default)]
    pub timeline: Option<String>,
    /// Hex SHA-256 over the serialized `modules` map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "_type")]
    pub kind: String,
    pub manifest: BundleManifest,
    pub modules: Map<String, Value>,
}

impl Bundle {
    /// Package `state`, refusing documents that fail the integrity check.
    pub fn from_state(state: &GameState) -> Result<Self, SaveError> {
        let issues = validate_state(state);
        if !issues.is_empty() {
            return Err(SaveError::Integrity(issues));
        }

        let mut modules = Map::new();
        for (module, section) in MODULE_SECTIONS {
            if let Some(value) = state.section(section) {
                modules.insert(module.to_string(), value.clone());
            }
        }

        let meta = state.meta();
        let manifest = BundleManifest {
            version: BUNDLE_VERSION.to_string(),
            season: meta.season,
            timeline: meta.timeline.map(|t| t.as_str().to_string()),
            checksum: Some(modules_checksum(&modules)?),
        };
        Ok(Self { kind: BUNDLE_TYPE.to_string(), manifest, modules })
    }

    /// Decode and check the `_type` tag.
    pub fn from_value(value: Value) -> Result<Self, SaveError> {
        if value.get("_type").and_then(Value::as_str) != Some(BUNDLE_TYPE) {
            return Err(SaveError::InvalidBundle(format!("expected _type {BUNDLE_TYPE}")));
        }
        if !value.get("modules").is_some_and(Value::is_object) {
            return Err(SaveError::InvalidBundle("modules must be a map".into()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Unpack into a document, verifying the checksum when the manifest has one.
    pub fn into_state(self) -> Result<GameState, SaveError> {
        if let Some(expected) = &self.manifest.checksum {
            let found = modules_checksum(&self.modules)?;
            if !expected.eq_ignore_ascii_case(&found) {
                return Err(SaveError::ChecksumMismatch { expected: expected.clone(), found });
            }
        }
        state_from_modules(self.modules)
    }
}

/// Assemble a document from named modules and run the integrity check.
pub fn state_from_modules(mut modules: Map<String, Value>) -> Result<GameState, SaveError> {
    if !modules.get("metadata").is_some_and(Value::is_object) {
        return Err(SaveError::InvalidBundle("missing metadata module".into()));
    }

    let mut doc = Map::new();
    for (module, section) in MODULE_SECTIONS {
        if let Some(value) = modules.remove(module) {
            doc.insert(section.to_string(), value);
        }
    }
    for unknown in modules.keys() {
        log::debug!("Ignoring unknown module {unknown}");
    }

    let state = GameState::from_value(Value::Object(doc))?;
    let issues = validate_state(&state);
    if !issues.is_empty() {
        return Err(SaveError::Integrity(issues));
    }
    Ok(state)
}

pub fn modules_checksum(modules: &Map<String, Value>) -> Result<String, SaveError> {
    let bytes = serde_json::to_vec(modules)?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

/// `ccsf_<season>_<timeline>.ccsf.json`
pub fn export_file_name(state: &GameState) -> String {
    let meta = state.meta();
    let season = meta.season.map_or_else(|| "unknown".to_string(), |s| s.to_string());
    let timeline = meta.timeline.map_or("unknown", |t| t.as_str());
    format!("ccsf_{season}_{timeline}.ccsf.json")
}
