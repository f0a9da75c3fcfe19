//! Load-time sanity checks
//!
//! Run once on a loaded or resumed document before any patch is applied.
//! Missing scaffolding is filled from the new-game defaults and stale
//! standings are rebuilt. A well-formed document is left untouched.

use crate::config::EngineConfig;
use crate::numeric;
use crate::standings::{compute_standings, Standings};
use crate::state::{GameState, Timeline};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Repair {
    /// `meta` was missing or not a map
    MetaSection,
    Season(i64),
    Timeline(Timeline),
    LastCompletedRound(u32),
    /// `stats` was missing or not a map
    StatsSection,
    /// `stats.race_results` was missing or not a sequence
    RaceResults,
    /// Cached standings were missing or empty and have been rebuilt
    Standings { drivers: usize, teams: usize },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Repair::MetaSection => write!(f, "created meta section"),
            Repair::Season(season) => write!(f, "set meta.season to {season}"),
            Repair::Timeline(timeline) => write!(f, "set meta.timeline to {timeline}"),
            Repair::LastCompletedRound(round) => {
                write!(f, "set meta.last_completed_round to {round}")
            }
            Repair::StatsSection => write!(f, "created stats section"),
            Repair::RaceResults => write!(f, "reset stats.race_results to an empty list"),
            Repair::Standings { drivers, teams } => {
                write!(f, "rebuilt standings ({drivers} drivers, {teams} teams)")
            }
        }
    }
}

/// Validate and repair `state`, returning every repair performed.
pub fn check_and_repair(state: &mut GameState, config: &EngineConfig) -> Vec<Repair> {
    let mut repairs = Vec::new();
    let defaults = &config.new_game;

    if !state.section("meta").is_some_and(Value::is_object) {
        repairs.push(Repair::MetaSection);
    }
    let meta = state.section_object_mut("meta");
    if meta.get("season").and_then(numeric::as_index).is_none() {
        meta.insert("season".into(), Value::from(defaults.season));
        repairs.push(Repair::Season(defaults.season));
    }
    if meta.get("timeline").and_then(Value::as_str).and_then(Timeline::parse).is_none() {
        meta.insert("timeline".into(), Value::from(defaults.timeline.as_str()));
        repairs.push(Repair::Timeline(defaults.timeline));
    }
    match meta.get("last_completed_round") {
        Some(v) if numeric::as_index(v).is_some() => {}
        Some(v) => {
            // negative or fractional rounds are floored into range
            let round = numeric::as_number(v).map_or(defaults.last_completed_round, |r| {
                r.max(0.0).min(u32::MAX as f64).floor() as u32
            });
            meta.insert("last_completed_round".into(), Value::from(round));
            repairs.push(Repair::LastCompletedRound(round));
        }
        None => {
            meta.insert("last_completed_round".into(), Value::from(defaults.last_completed_round));
            repairs.push(Repair::LastCompletedRound(defaults.last_completed_round));
        }
    }

    if !state.section("stats").is_some_and(Value::is_object) {
        repairs.push(Repair::StatsSection);
    }
    let stats = state.section_object_mut("stats");
    if !stats.get("race_results").is_some_and(Value::is_array) {
        if stats.get("race_results").is_some_and(|v| !v.is_null()) {
            log::warn!("stats.race_results is not a list, discarding it");
        }
        stats.insert("race_results".into(), Value::Array(Vec::new()));
        repairs.push(Repair::RaceResults);
    }

    let cached = |key: &str| {
        stats.get(key).and_then(Value::as_array).is_some_and(|rows| !rows.is_empty())
    };
    if !cached("driver_standings") || !cached("constructor_standings") {
        let standings = compute_standings(state, config);
        if standings_differ(state, &standings) {
            let repair = Repair::Standings {
                drivers: standings.drivers.len(),
                teams: standings.teams.len(),
            };
            match state.store_standings(&standings) {
                Ok(()) => repairs.push(repair),
                Err(e) => log::warn!("Could not store rebuilt standings: {e}"),
            }
        }
    }

    for repair in &repairs {
        log::info!("Sanity repair: {repair}");
    }
    repairs
}

/// An empty season legitimately caches empty standings; only a cache that
/// disagrees with a fresh computation counts as stale.
fn standings_differ(state: &GameState, fresh: &Standings) -> bool {
    let (Ok(drivers), Ok(teams)) =
        (serde_json::to_value(&fresh.drivers), serde_json::to_value(&fresh.teams))
    else {
        return true;
    };
    state.pointer("/stats/driver_standings") != Some(&drivers)
        || state.pointer("/stats/constructor_standings") != Some(&teams)
}
