use crate::config::EngineConfig;
use crate::numeric;
use serde_json::Value;

/// Vehicle attribute bounds: numeric writes anywhere below a marker segment
/// (`car` by default) are clamped into `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct AttributeClamp<'a> {
    marker: &'a str,
    min: f64,
    max: f64,
}

impl<'a> AttributeClamp<'a> {
    pub fn new(marker: &'a str, min: f64, max: f64) -> Self {
        Self { marker, min, max }
    }

    pub fn from_config(config: &'a EngineConfig) -> Self {
        Self::new(&config.vehicle_marker, config.attribute_min, config.attribute_max)
    }

    /// True when the value at `segments` lives inside a vehicle subtree.
    pub fn applies_to(&self, segments: &[String]) -> bool {
        segments
            .split_last()
            .is_some_and(|(_, parents)| parents.iter().any(|s| s == self.marker))
    }

    pub fn clamp_number(&self, segments: &[String], v: f64) -> f64 {
        if self.applies_to(segments) {
            v.clamp(self.min, self.max)
        } else {
            v
        }
    }

    /// Non-numeric values pass through untouched.
    pub fn clamp_value(&self, segments: &[String], value: Value) -> Value {
        let Some(v) = numeric::as_number(&value) else {
            return value;
        };
        if !self.applies_to(segments) || (self.min..=self.max).contains(&v) {
            return value;
        }
        numeric::to_value(v.clamp(self.min, self.max))
    }
}
