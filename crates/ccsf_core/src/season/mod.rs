//! Season progression
//!
//! Tracks which calendar round comes next and advances the completed-round
//! pointer (`meta.last_completed_round`). The pointer only ever moves up.

use crate::state::{CalendarEntry, GameState, Timeline};
use serde::Serialize;

/// Result of the next-race lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextRace {
    pub entry: CalendarEntry,
    /// True when no round is left and the lookup fell back to the opening
    /// round; callers should treat this as "season complete".
    pub wrapped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub previous_round: u32,
    pub current_round: u32,
    pub previous_timeline: Option<Timeline>,
    pub timeline: Option<Timeline>,
}

impl ProgressUpdate {
    pub fn advanced(&self) -> bool {
        self.current_round > self.previous_round
    }

    pub fn timeline_changed(&self) -> bool {
        self.timeline != self.previous_timeline
    }
}

/// Highest round that appears in stored results.
pub fn max_result_round(state: &GameState) -> Option<u32> {
    state.race_results().iter().filter_map(|r| r.round).max()
}

/// The calendar entry with the smallest round strictly after both the
/// completed-round pointer and every stored result. Falls back to the
/// lowest round (flagged as `wrapped`) once the calendar is exhausted.
pub fn next_race(state: &GameState) -> Option<NextRace> {
    let calendar = state.calendar();
    let done = state.meta().last_completed_round.max(max_result_round(state).unwrap_or(0));

    let upcoming = calendar.iter().filter(|c| c.round > done).min_by_key(|c| c.round);
    match upcoming {
        Some(entry) => Some(NextRace { entry: entry.clone(), wrapped: false }),
        None => {
            let first = calendar.iter().min_by_key(|c| c.round)?;
            log::info!("No round after {done}; season complete, wrapping to round {}", first.round);
            Some(NextRace { entry: first.clone(), wrapped: true })
        }
    }
}

/// Raise the pointer to the highest stored result round and move the
/// timeline forward: preseason → inseason once a round is done, inseason →
/// offseason once the final calendar round is done.
pub fn advance_after_results(state: &mut GameState) -> ProgressUpdate {
    let meta = state.meta();
    let previous_round = meta.last_completed_round;
    let current_round = previous_round.max(max_result_round(state).unwrap_or(0));

    if current_round > previous_round {
        state.set_last_completed_round(current_round);
        log::info!("Completed-round pointer advanced {previous_round} -> {current_round}");
    }

    let final_round = state.calendar().iter().map(|c| c.round).max();
    let timeline = match meta.timeline {
        Some(Timeline::Preseason) | None if current_round > 0 => {
            if final_round.is_some_and(|last| current_round >= last) {
                Some(Timeline::Offseason)
            } else {
                Some(Timeline::Inseason)
            }
        }
        Some(Timeline::Inseason) if final_round.is_some_and(|last| current_round >= last) => {
            Some(Timeline::Offseason)
        }
        other => other,
    };

    if timeline != meta.timeline {
        if let Some(timeline) = timeline {
            state.set_timeline(timeline);
            log::info!("Timeline moved to {timeline}");
        }
    }

    ProgressUpdate { previous_round, current_round, previous_timeline: meta.timeline, timeline }
}

/// Restore the pointer if something lowered it below `floor`.
/// Returns true when a repair was needed.
pub fn enforce_monotonic(state: &mut GameState, floor: u32) -> bool {
    let current = state.meta().last_completed_round;
    if current >= floor {
        return false;
    }
    log::warn!("Completed-round pointer lowered to {current}, restoring {floor}");
    state.set_last_completed_round(floor);
    true
}
