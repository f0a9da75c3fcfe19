use super::roster::scalar_text;
use crate::numeric;
use serde::Serialize;
use serde_json::{Map, Value};

/// One event. `round` is the ordering key, not the date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub round: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl CalendarEntry {
    /// Entries without a usable round number are dropped.
    pub fn decode_all(calendar: Option<&Value>) -> Vec<Self> {
        calendar
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .filter_map(|c| {
                let round = c.get("round").and_then(numeric::as_index)?;
                let name = c
                    .get("name")
                    .and_then(scalar_text)
                    .unwrap_or_else(|| format!("Round {round}"));
                Some(Self {
                    round,
                    name,
                    country: c.get("country").and_then(scalar_text),
                    date: c.get("date").and_then(scalar_text),
                    attrs: c.get("attrs").and_then(Value::as_object).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }
}
