//! Referential integrity of a season document.
//!
//! Every problem is collected; nothing stops at the first issue.

use crate::state::roster::scalar_text;
use crate::state::GameState;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// `(section, id field)` pairs whose ids must be unique.
const UNIQUE_IDS: [(&str, &str); 6] = [
    ("teams", "team_id"),
    ("drivers", "driver_id"),
    ("principals", "tp_id"),
    ("engineers", "re_id"),
    ("calendar", "circuit_id"),
    ("rumours", "rumour_id"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    DuplicateId { section: String, id: String },
    DriverUnknownTeam { driver: String, team: String },
    TeamMissingDriver { team: String, driver: String },
    TeamMissingEngineer { team: String, engineer: String },
    TeamMissingPrincipal { team: String, principal: String },
    EngineerUnknownDriver { engineer: String, driver: String },
    EngineerUnknownTeam { engineer: String, team: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IntegrityIssue::DuplicateId { section, id } => {
                write!(f, "duplicate id {id} in {section}")
            }
            IntegrityIssue::DriverUnknownTeam { driver, team } => {
                write!(f, "driver {driver} has unknown team {team}")
            }
            IntegrityIssue::TeamMissingDriver { team, driver } => {
                write!(f, "team {team} lists missing driver {driver}")
            }
            IntegrityIssue::TeamMissingEngineer { team, engineer } => {
                write!(f, "team {team} lists missing engineer {engineer}")
            }
            IntegrityIssue::TeamMissingPrincipal { team, principal } => {
                write!(f, "team {team} has missing principal {principal}")
            }
            IntegrityIssue::EngineerUnknownDriver { engineer, driver } => {
                write!(f, "engineer {engineer} has unknown driver {driver}")
            }
            IntegrityIssue::EngineerUnknownTeam { engineer, team } => {
                write!(f, "engineer {engineer} has unknown team {team}")
            }
        }
    }
}

fn records<'a>(state: &'a GameState, section: &str) -> impl Iterator<Item = &'a Value> {
    state.section(section).and_then(Value::as_array).into_iter().flatten()
}

fn field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(scalar_text)
}

fn ids(state: &GameState, section: &str, key: &str) -> HashSet<String> {
    records(state, section).filter_map(|r| field(r, key)).collect()
}

/// Check id uniqueness and cross references. Empty means valid.
///
/// References are only checked when present: a driver without a `team`
/// field is a free agent, not an error.
pub fn validate_state(state: &GameState) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    for (section, key) in UNIQUE_IDS {
        let mut seen = HashSet::new();
        for id in records(state, section).filter_map(|r| field(r, key)) {
            if !seen.insert(id.clone()) {
                issues.push(IntegrityIssue::DuplicateId { section: section.to_string(), id });
            }
        }
    }

    let teams = ids(state, "teams", "team_id");
    let drivers = ids(state, "drivers", "driver_id");
    let engineers = ids(state, "engineers", "re_id");
    let principals = ids(state, "principals", "tp_id");

    for driver in records(state, "drivers") {
        let id = field(driver, "driver_id").unwrap_or_default();
        if let Some(team) = field(driver, "team").filter(|t| !teams.contains(t)) {
            issues.push(IntegrityIssue::DriverUnknownTeam { driver: id, team });
        }
    }

    for team in records(state, "teams") {
        let id = field(team, "team_id").unwrap_or_default();
        let listed = |key: &str| -> Vec<String> {
            team.get(key)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(scalar_text)
                .collect()
        };
        for driver in listed("drivers").into_iter().filter(|d| !drivers.contains(d)) {
            issues.push(IntegrityIssue::TeamMissingDriver { team: id.clone(), driver });
        }
        for engineer in listed("race_engineers").into_iter().filter(|e| !engineers.contains(e)) {
            issues.push(IntegrityIssue::TeamMissingEngineer { team: id.clone(), engineer });
        }
        if let Some(principal) = field(team, "team_principal").filter(|p| !principals.contains(p)) {
            issues.push(IntegrityIssue::TeamMissingPrincipal { team: id.clone(), principal });
        }
    }

    for engineer in records(state, "engineers") {
        let id = field(engineer, "re_id").unwrap_or_default();
        if let Some(driver) = field(engineer, "driver").filter(|d| !drivers.contains(d)) {
            issues.push(IntegrityIssue::EngineerUnknownDriver { engineer: id.clone(), driver });
        }
        if let Some(team) = field(engineer, "team").filter(|t| !teams.contains(t)) {
            issues.push(IntegrityIssue::EngineerUnknownTeam { engineer: id, team });
        }
    }

    if !issues.is_empty() {
        log::warn!("Integrity check found {} issue(s)", issues.len());
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paddock() -> serde_json::Value {
        json!({
            "meta": {"season": 2025, "timeline": "preseason"},
            "teams": [{
                "team_id": "rbr", "team_name": "Red Bull",
                "drivers": ["ver"], "race_engineers": ["gp", null], "team_principal": "ch"
            }],
            "drivers": [{"driver_id": "ver", "name": "Max Verstappen", "team": "rbr"}],
            "principals": [{"tp_id": "ch", "name": "Christian"}],
            "engineers": [{"re_id": "gp", "driver": "ver", "team": "rbr"}],
            "calendar": [{"round": 1, "circuit_id": "bhr"}],
            "rumours": [{"rumour_id": 1}, {"rumour_id": 2}]
        })
    }

    #[test]
    fn test_consistent_paddock_is_clean() {
        let state = GameState::from_value(paddock()).unwrap();
        assert!(validate_state(&state).is_empty());
    }

    #[test]
    fn test_all_issues_collected() {
        let mut doc = paddock();
        doc["drivers"][0]["team"] = json!("ferrari");
        doc["teams"][0]["drivers"] = json!(["ver", "per"]);
        doc["teams"][0]["team_principal"] = json!("toto");
        doc["engineers"][0]["driver"] = json!("ham");
        doc["rumours"][1]["rumour_id"] = json!(1);
        let state = GameState::from_value(doc).unwrap();

        let issues = validate_state(&state);
        assert_eq!(issues.len(), 5);
        assert!(issues.contains(&IntegrityIssue::DuplicateId { section: "rumours".into(), id: "1".into() }));
        assert!(issues.contains(&IntegrityIssue::DriverUnknownTeam { driver: "ver".into(), team: "ferrari".into() }));
        assert!(issues.contains(&IntegrityIssue::TeamMissingDriver { team: "rbr".into(), driver: "per".into() }));
        assert!(issues.contains(&IntegrityIssue::TeamMissingPrincipal { team: "rbr".into(), principal: "toto".into() }));
        assert!(issues.contains(&IntegrityIssue::EngineerUnknownDriver { engineer: "gp".into(), driver: "ham".into() }));
    }

    #[test]
    fn test_issue_messages() {
        let issue = IntegrityIssue::TeamMissingEngineer { team: "rbr".into(), engineer: "gp".into() };
        assert_eq!(issue.to_string(), "team rbr lists missing engineer gp");
    }
}
