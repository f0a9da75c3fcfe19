use crate::numeric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where the save sits in the season cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeline {
    #[default]
    Preseason,
    Inseason,
    Offseason,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::Preseason => "preseason",
            Timeline::Inseason => "inseason",
            Timeline::Offseason => "offseason",
        }
    }

    /// Lenient parse: `"In-Season"`, `"in_season"` and `"inseason"` are the same.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "preseason" => Some(Timeline::Preseason),
            "inseason" => Some(Timeline::Inseason),
            "offseason" => Some(Timeline::Offseason),
            _ => None,
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of the `meta` section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meta {
    pub season: Option<i64>,
    pub timeline: Option<Timeline>,
    /// Highest finished round; absent or malformed reads as 0
    pub last_completed_round: u32,
}

impl Meta {
    pub fn from_value(meta: Option<&Value>) -> Self {
        let Some(meta) = meta.and_then(Value::as_object) else {
            return Self::default();
        };
        Self {
            season: meta.get("season").and_then(numeric::as_index).map(i64::from),
            timeline: meta.get("timeline").and_then(Value::as_str).and_then(Timeline::parse),
            last_completed_round: meta
                .get("last_completed_round")
                .and_then(numeric::as_index)
                .unwrap_or(0),
        }
    }
}
