//! Engine entry points
//!
//! Wires the components together in the order one turn needs them:
//! patch → progression → standings. `resume` runs the sanity checker on a
//! freshly loaded document. The engine holds configuration only; the
//! document is passed in on every call.

use crate::config::EngineConfig;
use crate::patch::{parse_path, PatchApplier, PatchFailure, PatchOutcome};
use crate::reply::{parse_reply, AssistantReply};
use crate::sanity::{check_and_repair, Repair};
use crate::season::{self, NextRace, ProgressUpdate};
use crate::standings::{compute_standings, Standings};
use crate::state::GameState;
use serde_json::Value;

/// Everything one `apply_batch` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub outcome: PatchOutcome,
    /// Set when the batch touched race results
    pub progress: Option<ProgressUpdate>,
    /// Pointer value restored after the batch tried to lower it
    pub restored_round: Option<u32>,
    /// Fresh standings, stored in the document on success
    pub standings: Option<Standings>,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Machine-readable failure reason, `None` on success
    pub fn reason(&self) -> Option<&'static str> {
        self.outcome.reason()
    }
}

/// Result of handling one generator reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyOutcome {
    pub reply: Option<AssistantReply>,
    pub report: Option<BatchReport>,
    /// Text to show the player
    pub message: String,
}

impl ReplyOutcome {
    pub fn state_changed(&self) -> bool {
        self.report.as_ref().is_some_and(BatchReport::is_ok)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and repair a loaded document before the first batch.
    pub fn resume(&self, state: &mut GameState) -> Vec<Repair> {
        check_and_repair(state, &self.config)
    }

    /// Apply one patch batch and bring derived data up to date.
    pub fn apply_batch(&self, state: &mut GameState, batch: &Value) -> BatchReport {
        let floor = state.meta().last_completed_round;
        let outcome = PatchApplier::new(&self.config).apply(state.as_value_mut(), batch);

        let mut report =
            BatchReport { outcome, progress: None, restored_round: None, standings: None };
        if report.outcome.failure == Some(PatchFailure::NoOps) {
            return report;
        }

        if season::enforce_monotonic(state, floor) {
            report.restored_round = Some(floor);
        }
        if !report.is_ok() {
            return report;
        }

        if report.outcome.changed.iter().any(|p| touches_race_results(p)) {
            report.progress = Some(season::advance_after_results(state));
        }

        let standings = compute_standings(state, &self.config);
        if let Err(e) = state.store_standings(&standings) {
            log::warn!("Could not store standings: {e}");
        }
        report.standings = Some(standings);
        report
    }

    pub fn standings(&self, state: &GameState) -> Standings {
        compute_standings(state, &self.config)
    }

    pub fn next_race(&self, state: &GameState) -> Option<NextRace> {
        season::next_race(state)
    }

    /// Parse a generator reply, apply its ops and compose the player-facing
    /// message.
    pub fn handle_reply(&self, state: &mut GameState, text: &str) -> ReplyOutcome {
        let Some(reply) = parse_reply(text) else {
            log::info!("Reply carried no JSON payload");
            return ReplyOutcome { reply: None, report: None, message: text.trim().to_string() };
        };

        let report = reply.ops.as_ref().map(|ops| self.apply_batch(state, ops));
        let message = match &report {
            Some(r) if r.is_ok() => {
                let paths = r.outcome.changed.join(", ");
                if reply.narration.is_empty() {
                    format!("Database updated: {paths}")
                } else {
                    format!("{}\n\nDatabase updated: {paths}", reply.narration)
                }
            }
            _ if reply.narration.is_empty() => text.trim().to_string(),
            _ => reply.narration.clone(),
        };

        ReplyOutcome { reply: Some(reply), report, message }
    }
}

/// True for `stats.race_results` and anything below it, and for a write to
/// `stats` itself, which can replace the whole results list.
fn touches_race_results(path: &str) -> bool {
    match parse_path(path).as_slice() {
        [stats] => stats == "stats",
        [stats, results, ..] => stats == "stats" && results == "race_results",
        [] => false,
    }
}
