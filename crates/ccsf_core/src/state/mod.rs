//! Game State Document
//!
//! `GameState` owns the live season document: one nested JSON map holding
//! `meta`, `teams`, `drivers`, `calendar`, `regulations` and `stats`. The
//! document is mutated in place by patch batches and persisted by the caller
//! after each successful mutation. There is no global instance; callers pass
//! the state into every engine call.
//!
//! Typed views (`Meta`, `Roster`, `CalendarEntry`, `RaceResult`) are decoded
//! on demand so that business logic never reads loose JSON directly.

pub mod calendar;
pub mod init;
pub mod meta;
pub mod roster;

pub use calendar::CalendarEntry;
pub use init::{first_run_init, FirstRunReport};
pub use meta::{Meta, Timeline};
pub use roster::{Roster, RosterDriver, RosterTeam};

use crate::error::{CoreError, Result};
use crate::standings::{RaceResult, Standings};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    doc: Value,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Create an empty document
    pub fn new() -> Self {
        Self { doc: Value::Object(Map::new()) }
    }

    /// Wrap an existing document. The root must be a JSON object.
    pub fn from_value(doc: Value) -> Result<Self> {
        if !doc.is_object() {
            return Err(CoreError::InvalidDocument("game state root must be an object".into()));
        }
        Ok(Self { doc })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.doc
    }

    pub fn into_value(self) -> Value {
        self.doc
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.doc)?)
    }

    /// Top-level section such as `meta` or `stats`
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    /// RFC 6901 lookup, e.g. `/stats/race_results`
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.doc.pointer(pointer)
    }

    /// Top-level section as a map, replacing anything that is not one.
    pub(crate) fn section_object_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        let root = self.root_mut();
        let slot = root.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("section was just replaced with an object"),
        }
    }

    fn root_mut(&mut self) -> &mut Map<String, Value> {
        if !self.doc.is_object() {
            self.doc = Value::Object(Map::new());
        }
        match &mut self.doc {
            Value::Object(map) => map,
            _ => unreachable!("root was just replaced with an object"),
        }
    }

    // ========================
    // Meta
    // ========================

    pub fn meta(&self) -> Meta {
        Meta::from_value(self.section("meta"))
    }

    pub fn set_last_completed_round(&mut self, round: u32) {
        self.section_object_mut("meta").insert("last_completed_round".into(), Value::from(round));
    }

    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.section_object_mut("meta").insert("timeline".into(), Value::from(timeline.as_str()));
    }

    // ========================
    // Typed Views
    // ========================

    pub fn roster(&self) -> Roster {
        Roster::from_sections(self.section("teams"), self.section("drivers"))
    }

    pub fn calendar(&self) -> Vec<CalendarEntry> {
        CalendarEntry::decode_all(self.section("calendar"))
    }

    pub fn race_results(&self) -> Vec<RaceResult> {
        RaceResult::decode_all(self.pointer("/stats/race_results"))
    }

    /// Raw `regulations.points_system`, in whatever shape the document holds
    pub fn points_system(&self) -> Option<&Value> {
        self.pointer("/regulations/points_system")
    }

    // ========================
    // Derived Data
    // ========================

    /// Overwrite the cached standings views.
    pub fn store_standings(&mut self, standings: &Standings) -> Result<()> {
        let drivers = serde_json::to_value(&standings.drivers)?;
        let teams = serde_json::to_value(&standings.teams)?;
        let stats = self.section_object_mut("stats");
        stats.insert("driver_standings".into(), drivers);
        stats.insert("constructor_standings".into(), teams);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_root() {
        assert!(GameState::from_value(json!([1, 2, 3])).is_err());
        assert!(GameState::from_json("{\"meta\": {}}").is_ok());
    }

    #[test]
    fn test_meta_setters_create_section() {
        let mut state = GameState::new();
        state.set_last_completed_round(4);
        state.set_timeline(Timeline::Inseason);

        let meta = state.meta();
        assert_eq!(meta.last_completed_round, 4);
        assert_eq!(meta.timeline, Some(Timeline::Inseason));
    }

    #[test]
    fn test_section_object_mut_replaces_scalars() {
        let mut state = GameState::from_value(json!({"stats": 7})).unwrap();
        state.section_object_mut("stats").insert("race_results".into(), json!([]));
        assert_eq!(state.pointer("/stats/race_results"), Some(&json!([])));
    }

    #[test]
    fn test_key_order_survives_roundtrip() {
        let text = r#"{"meta":{"season":2025},"teams":[],"calendar":[],"stats":{}}"#;
        let state = GameState::from_json(text).unwrap();
        let keys: Vec<&String> = state.as_value().as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["meta", "teams", "calendar", "stats"]);
    }
}
