//! Roster view: canonical teams and drivers decoded from the document.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct RosterTeam {
    pub id: String,
    /// Canonical team name
    pub name: String,
    /// Driver ids
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterDriver {
    pub id: String,
    pub name: String,
    /// Team reference as written in the document (normally a team id)
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    pub teams: Vec<RosterTeam>,
    pub drivers: Vec<RosterDriver>,
}

impl Roster {
    pub fn from_sections(teams: Option<&Value>, drivers: Option<&Value>) -> Self {
        let teams = objects(teams)
            .filter_map(|t| {
                let id = text(t, &["team_id", "id"]);
                let name = text(t, &["team_name", "name"]);
                let (id, name) = match (id, name) {
                    (Some(id), Some(name)) => (id, name),
                    (Some(id), None) => (id.clone(), id),
                    (None, Some(name)) => (name.clone(), name),
                    (None, None) => return None,
                };
                let drivers = t
                    .get("drivers")
                    .and_then(Value::as_array)
                    .map(|ids| ids.iter().filter_map(scalar_text).collect())
                    .unwrap_or_default();
                Some(RosterTeam { id, name, drivers })
            })
            .collect();

        let drivers = objects(drivers)
            .filter_map(|d| {
                let id = text(d, &["driver_id", "id"]);
                let name = text(d, &["name", "driver_name"]);
                let (id, name) = match (id, name) {
                    (Some(id), Some(name)) => (id, name),
                    (Some(id), None) => (id.clone(), id),
                    (None, Some(name)) => (name.clone(), name),
                    (None, None) => return None,
                };
                Some(RosterDriver { id, name, team: text(d, &["team", "team_id"]) })
            })
            .collect();

        Self { teams, drivers }
    }

    /// Canonical team names in roster order.
    pub fn team_names(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn team_position(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.name == name)
    }

    pub fn driver_position(&self, name: &str) -> Option<usize> {
        self.drivers.iter().position(|d| d.name == name)
    }

    /// Match a result label against driver ids (exact) and names (case-insensitive).
    pub fn find_driver(&self, label: &str) -> Option<&RosterDriver> {
        let label = label.trim();
        self.drivers
            .iter()
            .find(|d| d.id == label)
            .or_else(|| self.drivers.iter().find(|d| d.name.eq_ignore_ascii_case(label)))
    }

    /// The roster team a driver belongs to: the driver's own team reference
    /// first, then any team listing the driver id.
    pub fn team_of(&self, driver: &RosterDriver) -> Option<&RosterTeam> {
        if let Some(reference) = driver.team.as_deref() {
            let found = self.teams.iter().find(|t| t.id == reference).or_else(|| {
                self.teams.iter().find(|t| t.name.eq_ignore_ascii_case(reference))
            });
            if found.is_some() {
                return found;
            }
        }
        self.teams.iter().find(|t| t.drivers.iter().any(|id| *id == driver.id))
    }
}

fn objects(section: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    section.and_then(Value::as_array).into_iter().flatten().filter_map(Value::as_object)
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(scalar_text))
}

/// Ids are sometimes written as numbers.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Roster {
        Roster::from_sections(
            Some(&json!([
                {"team_id": "rbr", "team_name": "Red Bull", "drivers": ["ver", "per"]},
                {"team_id": "fer", "team_name": "Ferrari", "drivers": ["lec"]},
                {"note": "no identity"}
            ])),
            Some(&json!([
                {"driver_id": "ver", "name": "Max Verstappen", "team": "rbr"},
                {"driver_id": "per", "name": "Sergio Perez"},
                {"driver_id": "lec", "name": "Charles Leclerc", "team": "Ferrari"}
            ])),
        )
    }

    #[test]
    fn test_decode_skips_anonymous_entries() {
        let roster = sample();
        assert_eq!(roster.team_names(), vec!["Red Bull", "Ferrari"]);
        assert_eq!(roster.drivers.len(), 3);
    }

    #[test]
    fn test_find_driver_by_id_or_name() {
        let roster = sample();
        assert_eq!(roster.find_driver("ver").unwrap().name, "Max Verstappen");
        assert_eq!(roster.find_driver("charles leclerc").unwrap().id, "lec");
        assert!(roster.find_driver("Nobody").is_none());
    }

    #[test]
    fn test_team_of_uses_reference_then_membership() {
        let roster = sample();
        let ver = roster.find_driver("ver").unwrap();
        assert_eq!(roster.team_of(ver).unwrap().name, "Red Bull");
        let per = roster.find_driver("per").unwrap();
        assert_eq!(roster.team_of(per).unwrap().name, "Red Bull");
        let lec = roster.find_driver("lec").unwrap();
        assert_eq!(roster.team_of(lec).unwrap().id, "fer");
    }
}
