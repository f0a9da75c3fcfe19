//! First-run initialisation for a freshly seeded save.

use super::GameState;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

/// Seed used when the caller does not supply one; keeps fresh games reproducible.
pub const DEFAULT_FIRST_RUN_SEED: u64 = 20_250_301;

/// Share of pending rumours that start the game already gaining traction.
const RUMOUR_NUDGE_CHANCE: f64 = 0.14;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FirstRunReport {
    /// Ids of rumours moved from `pending` to `gaining_traction`
    pub nudged_rumours: Vec<String>,
}

/// Player profile, forced team selection, a welcome mail and a deterministic
/// shuffle of the rumour mill.
pub fn first_run_init(state: &mut GameState, seed: u64) -> FirstRunReport {
    let meta = state.section_object_mut("meta");
    meta.insert(
        "player".into(),
        json!({
            "id": "player_1",
            "name": "Rookie",
            "difficulty": "normal",
            "assists": ["pitlimiter", "autoERS"]
        }),
    );
    meta.insert("selected_team".into(), Value::Null);

    let stats = state.section_object_mut("stats");
    let drama = stats.entry("boardroom_drama").or_insert_with(|| Value::Array(Vec::new()));
    if !drama.is_array() {
        *drama = Value::Array(Vec::new());
    }
    if let Value::Array(entries) = drama {
        entries.push(json!({
            "ts": chrono::Utc::now().timestamp_millis(),
            "type": "mail",
            "title": "Welcome to the Paddock",
            "body": "Tip: rumours are like tyres, manage the heat."
        }));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut report = FirstRunReport::default();
    if let Some(Value::Array(rumours)) = state.as_value_mut().get_mut("rumours") {
        for rumour in rumours.iter_mut().filter_map(Value::as_object_mut) {
            if rumour.get("status").and_then(Value::as_str) != Some("pending") {
                continue;
            }
            if rng.gen::<f64>() < RUMOUR_NUDGE_CHANCE {
                rumour.insert("status".into(), Value::from("gaining_traction"));
                let id = rumour.get("rumour_id").map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                report.nudged_rumours.extend(id);
            }
        }
    }

    log::info!("First-run init: {} rumour(s) nudged", report.nudged_rumours.len());
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> GameState {
        let rumours: Vec<Value> = (0..200)
            .map(|i| {
                let status = if i % 2 == 0 { "pending" } else { "debunked" };
                json!({"rumour_id": i, "status": status})
            })
            .collect();
        GameState::from_value(json!({"meta": {"season": 2025}, "stats": {}, "rumours": rumours}))
            .unwrap()
    }

    #[test]
    fn test_profile_and_mail_written() {
        let mut state = seeded();
        first_run_init(&mut state, DEFAULT_FIRST_RUN_SEED);

        assert_eq!(state.pointer("/meta/player/name"), Some(&json!("Rookie")));
        assert_eq!(state.pointer("/meta/selected_team"), Some(&Value::Null));
        assert_eq!(state.pointer("/meta/season"), Some(&json!(2025)));
        let drama = state.pointer("/stats/boardroom_drama").unwrap().as_array().unwrap();
        assert_eq!(drama.len(), 1);
        assert_eq!(drama[0]["type"], "mail");
    }

    #[test]
    fn test_rumour_nudge_is_deterministic() {
        let mut a = seeded();
        let mut b = seeded();
        let ra = first_run_init(&mut a, 7);
        let rb = first_run_init(&mut b, 7);
        assert_eq!(ra, rb);
        assert!(!ra.nudged_rumours.is_empty());
        assert_eq!(a.section("rumours"), b.section("rumours"));
    }

    #[test]
    fn test_only_pending_rumours_move() {
        let mut state = seeded();
        first_run_init(&mut state, 99);
        let rumours = state.section("rumours").unwrap().as_array().unwrap();
        for (i, rumour) in rumours.iter().enumerate() {
            if i % 2 == 1 {
                assert_eq!(rumour["status"], "debunked");
            }
        }
    }
}
