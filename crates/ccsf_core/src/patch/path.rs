//! Patch path resolution.
//!
//! Paths come in two spellings that normalize identically:
//! `/teams/rbr/car/drag` and `teams.rbr.car.drag`. Walking a path creates
//! missing intermediate maps, so resolution has side effects even when the
//! operation that triggered it is later skipped.

use serde_json::{Map, Value};

/// Identity fields used to address sequence elements by id instead of index.
pub const ELEMENT_ID_KEYS: [&str; 7] =
    ["id", "team_id", "driver_id", "tp_id", "re_id", "circuit_id", "rumour_id"];

/// Split a path into non-empty key segments.
pub fn parse_path(path: &str) -> Vec<String> {
    let normalized = match path.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => path.replace('.', "/"),
    };
    normalized.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Walk `segments[..len - 1]` from `root`, synthesizing maps for absent or
/// scalar values, and return the parent container of the final segment.
///
/// Returns `None` when the path is empty or a sequence along the way has no
/// element matching its segment; nothing is ever inserted into sequences.
pub fn ensure_parent<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let (_, intermediate) = segments.split_last()?;
    let mut current = root;
    for segment in intermediate {
        current = match current {
            Value::Object(map) => {
                map.entry(segment.clone()).or_insert_with(|| Value::Object(Map::new()))
            }
            Value::Array(items) => {
                let index = select_element(items, segment)?;
                &mut items[index]
            }
            _ => return None,
        };
        if !is_container(current) {
            *current = Value::Object(Map::new());
        }
    }
    Some(current)
}

/// The slot named by `key` inside `parent`. Map slots are created as `null`
/// when absent; sequence slots must already exist.
pub fn slot_mut<'a>(parent: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match parent {
        Value::Object(map) => Some(map.entry(key.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = select_element(items, key)?;
            Some(&mut items[index])
        }
        _ => None,
    }
}

/// Resolve the full path to a writable slot.
pub fn resolve_slot<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let key = segments.last()?;
    let parent = ensure_parent(root, segments)?;
    slot_mut(parent, key)
}

/// Index first, then identity match on [`ELEMENT_ID_KEYS`].
fn select_element(items: &[Value], segment: &str) -> Option<usize> {
    if let Ok(index) = segment.parse::<usize>() {
        if index < items.len() {
            return Some(index);
        }
    }
    items.iter().position(|item| {
        item.as_object().is_some_and(|obj| {
            ELEMENT_ID_KEYS.iter().any(|key| match obj.get(*key) {
                Some(Value::String(s)) => s == segment,
                Some(Value::Number(n)) => n.to_string() == segment,
                _ => false,
            })
        })
    })
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &str) -> Vec<String> {
        parse_path(path)
    }

    #[test]
    fn test_both_spellings_normalize_identically() {
        assert_eq!(parse_path("/teams/rbr/car/drag"), vec!["teams", "rbr", "car", "drag"]);
        assert_eq!(parse_path("teams.rbr.car.drag"), parse_path("/teams/rbr/car/drag"));
        assert_eq!(parse_path("//a///b/"), vec!["a", "b"]);
        assert!(parse_path("").is_empty());
        assert!(parse_path("/").is_empty());
    }

    #[test]
    fn test_slash_form_keeps_dots_inside_segments() {
        assert_eq!(parse_path("/regulations/v1.2"), vec!["regulations", "v1.2"]);
    }

    #[test]
    fn test_ensure_parent_synthesizes_maps() {
        let mut doc = json!({"a": 5});
        let parent = ensure_parent(&mut doc, &segs("/a/b/c")).unwrap();
        assert!(parent.is_object());
        assert_eq!(doc, json!({"a": {"b": {}}}));
    }

    #[test]
    fn test_ensure_parent_replaces_null() {
        let mut doc = json!({"stats": null});
        ensure_parent(&mut doc, &segs("stats.race_results")).unwrap();
        assert_eq!(doc, json!({"stats": {}}));
    }

    #[test]
    fn test_sequence_addressed_by_index_and_id() {
        let mut doc = json!({"teams": [{"team_id": "rbr"}, {"team_id": "fer", "car": {"drag": 40}}]});

        let slot = resolve_slot(&mut doc, &segs("/teams/fer/car/drag")).unwrap();
        assert_eq!(*slot, json!(40));

        let slot = resolve_slot(&mut doc, &segs("/teams/0/car/drag")).unwrap();
        *slot = json!(12);
        assert_eq!(doc["teams"][0]["car"]["drag"], json!(12));
    }

    #[test]
    fn test_unknown_sequence_element_is_unresolvable() {
        let mut doc = json!({"teams": [{"team_id": "rbr"}]});
        assert!(resolve_slot(&mut doc, &segs("/teams/mcl/car/drag")).is_none());
        assert!(resolve_slot(&mut doc, &segs("/teams/5")).is_none());
        assert_eq!(doc, json!({"teams": [{"team_id": "rbr"}]}));
    }

    #[test]
    fn test_empty_path_has_no_parent() {
        let mut doc = json!({});
        assert!(ensure_parent(&mut doc, &[]).is_none());
    }
}
