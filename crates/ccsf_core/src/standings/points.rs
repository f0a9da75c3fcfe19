//! Points table normalization.
//!
//! `regulations.points_system` shows up in three encodings:
//!
//! | Shape | Example |
//! |-------|---------|
//! | sequence, index 0 = winner | `[25, 18, 15]` |
//! | map keyed by integers | `{"1": 25, "2": 18}` |
//! | map keyed by `P<n>` | `{"P1": 25, "p2": 18}` |
//!
//! All three normalize to a position → points map. Anything else falls back
//! to the standard top-10 table.

use crate::config::DEFAULT_POINTS;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PointsTable {
    points: BTreeMap<u32, f64>,
}

impl Default for PointsTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PointsTable {
    /// 25-18-15-12-10-8-6-4-2-1
    pub fn standard() -> Self {
        Self::from_sequence(&DEFAULT_POINTS)
    }

    pub fn from_sequence(points: &[f64]) -> Self {
        Self { points: (1u32..).zip(points.iter().copied()).collect() }
    }

    /// Normalize a points configuration, falling back to [`PointsTable::standard`].
    pub fn normalize(config: Option<&Value>) -> Self {
        Self::normalize_or(config, &DEFAULT_POINTS)
    }

    /// Normalize a points configuration, falling back to `fallback`.
    pub fn normalize_or(config: Option<&Value>, fallback: &[f64]) -> Self {
        let points: BTreeMap<u32, f64> = match config {
            Some(Value::Array(items)) => (1u32..)
                .zip(items)
                .filter_map(|(pos, v)| point_value(v).map(|p| (pos, p)))
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(key, v)| Some((position_key(key)?, point_value(v)?)))
                .collect(),
            _ => BTreeMap::new(),
        };

        if points.is_empty() {
            log::debug!("Points configuration absent or unrecognized, using fallback table");
            return Self::from_sequence(fallback);
        }
        Self { points }
    }

    /// Points for a 1-based finishing position; `None` outside the table.
    pub fn points_for(&self, position: u32) -> Option<f64> {
        self.points.get(&position).copied()
    }

    pub fn as_map(&self) -> &BTreeMap<u32, f64> {
        &self.points
    }
}

/// `"3"`, `"P3"` and `"p3"` all mean third place.
fn position_key(key: &str) -> Option<u32> {
    let key = key.trim();
    let digits = key.strip_prefix(&['P', 'p'][..]).unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|p| *p >= 1)
}

fn point_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
