//! Race result decoding.
//!
//! Results are written by the generator and carry several legacy field
//! names. They are decoded once here into `RaceResult`/`Finisher`; the
//! calculator never looks at raw JSON.

use crate::numeric;
use crate::state::roster::scalar_text;
use serde_json::{Map, Value};

const FINISHER_LIST_KEYS: [&str; 3] = ["finishers", "classification", "results"];
const DRIVER_KEYS: [&str; 4] = ["driver", "name", "driver_name", "driver_id"];
const TEAM_KEYS: [&str; 3] = ["team", "constructor", "team_name"];
const POSITION_KEYS: [&str; 3] = ["position", "pos", "place"];
const POINTS_KEYS: [&str; 2] = ["points", "pts"];
const RACE_NAME_KEYS: [&str; 3] = ["name", "event", "race"];

#[derive(Debug, Clone, PartialEq)]
pub struct Finisher {
    /// Driver name or id as written in the result
    pub driver: String,
    /// Free-text team label, if any
    pub team: Option<String>,
    /// Explicit 1-based position
    pub position: Option<u32>,
    /// Explicit points award, overriding the table
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub round: Option<u32>,
    pub name: Option<String>,
    pub finishers: Vec<Finisher>,
}

impl RaceResult {
    /// Decode one stored result. Non-object entries yield `None`.
    pub fn decode(value: &Value) -> Option<Self> {
        let race = value.as_object()?;
        let finishers = FINISHER_LIST_KEYS
            .iter()
            .find_map(|k| race.get(*k).and_then(Value::as_array))
            .map(|list| list.iter().filter_map(Finisher::decode).collect())
            .unwrap_or_default();

        Some(Self {
            round: race.get("round").and_then(numeric::as_index),
            name: first(race, &RACE_NAME_KEYS).and_then(scalar_text),
            finishers,
        })
    }

    pub fn decode_all(results: Option<&Value>) -> Vec<Self> {
        results.and_then(Value::as_array).into_iter().flatten().filter_map(Self::decode).collect()
    }
}

impl Finisher {
    /// A bare string is a driver name. Entries without a driver are dropped.
    pub fn decode(value: &Value) -> Option<Self> {
        let entry = match value {
            Value::String(name) if !name.trim().is_empty() => {
                return Some(Self {
                    driver: name.trim().to_string(),
                    team: None,
                    position: None,
                    points: None,
                });
            }
            Value::Object(entry) => entry,
            _ => return None,
        };

        let driver = DRIVER_KEYS.iter().find_map(|k| entry.get(*k).and_then(scalar_text))?;
        Some(Self {
            driver,
            team: TEAM_KEYS.iter().find_map(|k| entry.get(*k).and_then(scalar_text)),
            position: first(entry, &POSITION_KEYS).and_then(parse_position),
            points: first(entry, &POINTS_KEYS).and_then(parse_points),
        })
    }
}

/// First alias that is present and not null.
fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

/// `3`, `"3"` and `"P3"` are third place; `"DNF"` and `0` are no position.
fn parse_position(value: &Value) -> Option<u32> {
    let position = match value {
        Value::String(s) => {
            let s = s.trim();
            numeric::as_index(&Value::from(s.strip_prefix(&['P', 'p'][..]).unwrap_or(s)))
        }
        other => numeric::as_index(other),
    }?;
    (position >= 1).then_some(position)
}

fn parse_points(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => numeric::as_number(value),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_shape() {
        let race = RaceResult::decode(&json!({
            "round": 1,
            "name": "Bahrain GP",
            "finishers": [
                {"driver": "A", "team": "Red", "position": 1, "points": 25},
                {"driver": "B", "team": "Blue", "position": 2}
            ]
        }))
        .unwrap();

        assert_eq!(race.round, Some(1));
        assert_eq!(race.name.as_deref(), Some("Bahrain GP"));
        assert_eq!(race.finishers.len(), 2);
        assert_eq!(race.finishers[0].points, Some(25.0));
        assert_eq!(race.finishers[1].points, None);
    }

    #[test]
    fn test_legacy_aliases() {
        let race = RaceResult::decode(&json!({
            "round": "4",
            "event": "Japanese GP",
            "classification": [
                {"name": "Max", "constructor": "Red Bull", "pos": "P1", "pts": "25"},
                {"driver_name": "Lando", "team_name": "McLaren", "place": "2"},
                "Oscar",
                {"team": "Haas"}
            ]
        }))
        .unwrap();

        assert_eq!(race.round, Some(4));
        assert_eq!(race.name.as_deref(), Some("Japanese GP"));
        let f = &race.finishers;
        assert_eq!(f.len(), 3);
        assert_eq!(f[0], Finisher { driver: "Max".into(), team: Some("Red Bull".into()), position: Some(1), points: Some(25.0) });
        assert_eq!(f[1].position, Some(2));
        assert_eq!(f[1].team.as_deref(), Some("McLaren"));
        assert_eq!(f[2].driver, "Oscar");
    }

    #[test]
    fn test_finishers_alias_precedence() {
        let race = RaceResult::decode(&json!({
            "round": 2,
            "finishers": [],
            "results": [{"driver": "ignored"}]
        }))
        .unwrap();
        assert!(race.finishers.is_empty());
    }

    #[test]
    fn test_non_positions() {
        assert_eq!(parse_position(&json!("DNF")), None);
        assert_eq!(parse_position(&json!(0)), None);
        assert_eq!(parse_position(&json!("p12")), Some(12));
        assert_eq!(parse_position(&json!(3)), Some(3));
    }

    #[test]
    fn test_decode_all_skips_junk() {
        let results = RaceResult::decode_all(Some(&json!([{"round": 1}, 5, "x", null])));
        assert_eq!(results.len(), 1);
        assert!(RaceResult::decode_all(Some(&json!({"round": 1}))).is_empty());
        assert!(RaceResult::decode_all(None).is_empty());
    }
}
