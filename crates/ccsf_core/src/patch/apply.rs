use super::clamp::AttributeClamp;
use super::path::{parse_path, resolve_slot};
use super::{Operation, PatchFailure, PatchOutcome, SkipReason, SkippedOp};
use crate::config::EngineConfig;
use crate::numeric;
use serde::Deserialize;
use serde_json::Value;

/// Applies patch batches to a document root.
pub struct PatchApplier<'a> {
    kind: &'a str,
    clamp: AttributeClamp<'a>,
}

impl<'a> PatchApplier<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { kind: &config.patch_kind, clamp: AttributeClamp::from_config(config) }
    }

    /// Apply every decodable, resolvable operation of `batch` to `root`.
    ///
    /// A batch with the wrong tag (`kind`, or legacy `_type`) or without a
    /// `changes` sequence is rejected before anything is touched.
    pub fn apply(&self, root: &mut Value, batch: &Value) -> PatchOutcome {
        let tag = batch.get("kind").or_else(|| batch.get("_type")).and_then(Value::as_str);
        let changes = batch.get("changes").and_then(Value::as_array);
        let Some(changes) = changes.filter(|_| tag == Some(self.kind)) else {
            log::warn!("Rejected patch batch: tag {:?}, expected {:?}", tag, self.kind);
            return PatchOutcome { failure: Some(PatchFailure::NoOps), ..PatchOutcome::default() };
        };

        let mut outcome = PatchOutcome::default();
        for (index, change) in changes.iter().enumerate() {
            let result = match Operation::deserialize(change) {
                Ok(op) => self.apply_operation(root, &op).map(|()| op.path().to_string()),
                Err(e) => {
                    log::debug!("Change #{index} undecodable: {e}");
                    Err(SkipReason::Undecodable)
                }
            };
            match result {
                Ok(path) => outcome.changed.push(path),
                Err(reason) => {
                    let path = change.get("path").and_then(Value::as_str).map(str::to_string);
                    log::debug!("Skipped change #{index} ({:?}): {}", path, reason.as_str());
                    outcome.skipped.push(SkippedOp { index, path, reason });
                }
            }
        }

        if outcome.changed.is_empty() {
            outcome.failure = Some(PatchFailure::NoEffectiveChanges);
            log::info!("Patch batch had no effective changes ({} skipped)", outcome.skipped.len());
        } else {
            log::info!(
                "Patch batch applied: {} changed, {} skipped",
                outcome.changed.len(),
                outcome.skipped.len()
            );
        }
        outcome
    }

    /// Apply one operation. Intermediate maps may be created even when the
    /// final slot turns out to be unresolvable.
    pub fn apply_operation(&self, root: &mut Value, op: &Operation) -> Result<(), SkipReason> {
        let segments = parse_path(op.path());
        if segments.is_empty() {
            return Err(SkipReason::EmptyPath);
        }
        let slot = resolve_slot(root, &segments).ok_or(SkipReason::Unresolvable)?;

        match op {
            Operation::Set { value, .. } => {
                *slot = self.clamp.clamp_value(&segments, value.clone());
            }
            Operation::Inc { value, .. } => {
                let current = numeric::as_number(slot).unwrap_or(0.0);
                let next = current + numeric::coerce_number(value);
                *slot = numeric::to_value(self.clamp.clamp_number(&segments, next));
            }
            Operation::Push { value, .. } => {
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                if let Value::Array(items) = slot {
                    items.push(value.clone());
                }
            }
        }
        log::debug!("Applied {} {}", op.name(), op.path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(changes: Value) -> Value {
        json!({"kind": "patch-v1", "changes": changes})
    }

    fn apply(doc: &mut Value, changes: Value) -> PatchOutcome {
        let config = EngineConfig::default();
        PatchApplier::new(&config).apply(doc, &batch(changes))
    }

    #[test]
    fn test_set_creates_missing_structure() {
        let mut doc = json!({});
        let outcome =
            apply(&mut doc, json!([{"op": "set", "path": "meta.selected_team", "value": "rbr"}]));
        assert!(outcome.is_ok());
        assert_eq!(outcome.changed, vec!["meta.selected_team"]);
        assert_eq!(doc, json!({"meta": {"selected_team": "rbr"}}));
    }

    #[test]
    fn test_set_clamps_vehicle_attributes() {
        let mut doc = json!({"teams": [{"team_id": "rbr", "car": {"drag": 50}}]});
        apply(
            &mut doc,
            json!([
                {"op": "set", "path": "/teams/rbr/car/drag", "value": 140},
                {"op": "set", "path": "/teams/rbr/car/engine_power", "value": -3}
            ]),
        );
        assert_eq!(doc["teams"][0]["car"], json!({"drag": 100, "engine_power": 0}));
    }

    #[test]
    fn test_inc_treats_missing_and_non_numeric_as_zero() {
        let mut doc = json!({"a": {"label": "fast"}});
        apply(
            &mut doc,
            json!([
                {"op": "inc", "path": "/a/count", "value": 2},
                {"op": "inc", "path": "/a/label", "value": "3"},
                {"op": "inc", "path": "/a/count", "value": "oops"}
            ]),
        );
        assert_eq!(doc, json!({"a": {"label": 3, "count": 2}}));
    }

    #[test]
    fn test_inc_clamps_after_adding() {
        let mut doc = json!({"teams": [{"team_id": "fer", "car": {"reliability": 97}}]});
        apply(&mut doc, json!([{"op": "inc", "path": "teams.fer.car.reliability", "value": 10}]));
        assert_eq!(doc["teams"][0]["car"]["reliability"], json!(100));
    }

    #[test]
    fn test_push_replaces_non_sequence() {
        let mut doc = json!({"stats": {"race_results": "corrupt"}});
        apply(&mut doc, json!([{"op": "push", "path": "/stats/race_results", "value": {"round": 1}}]));
        assert_eq!(doc["stats"]["race_results"], json!([{"round": 1}]));
    }

    #[test]
    fn test_wrong_tag_is_no_ops_and_untouched() {
        let config = EngineConfig::default();
        let mut doc = json!({"meta": {"season": 2025}});
        let before = doc.clone();

        let outcome = PatchApplier::new(&config).apply(&mut doc, &json!({"kind": "wrong"}));
        assert_eq!(outcome.reason(), Some("no-ops"));
        assert_eq!(doc, before);

        let outcome = PatchApplier::new(&config)
            .apply(&mut doc, &json!({"kind": "patch-v1", "changes": {"op": "set"}}));
        assert_eq!(outcome.failure, Some(PatchFailure::NoOps));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_all_unresolvable_is_zero_effective_changes() {
        let mut doc = json!({"teams": []});
        let outcome = apply(
            &mut doc,
            json!([
                {"op": "set", "path": "/teams/mcl/car/drag", "value": 1},
                {"op": "set", "path": "", "value": 1},
                {"op": "explode", "path": "/meta"}
            ]),
        );
        assert_eq!(outcome.reason(), Some("no-effective-changes"));
        let reasons: Vec<_> = outcome.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![SkipReason::Unresolvable, SkipReason::EmptyPath, SkipReason::Undecodable]
        );
        assert_eq!(outcome.skipped[2].path.as_deref(), Some("/meta"));
    }

    #[test]
    fn test_mixed_batch_is_not_transactional() {
        let mut doc = json!({"teams": [{"team_id": "rbr"}]});
        let outcome = apply(
            &mut doc,
            json!([
                {"op": "set", "path": "/teams/rbr/principal", "value": "CH"},
                {"op": "set", "path": "/teams/ghost/principal", "value": "X"}
            ]),
        );
        assert!(outcome.is_ok());
        assert_eq!(outcome.changed, vec!["/teams/rbr/principal"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(doc["teams"][0]["principal"], json!("CH"));
    }

    #[test]
    fn test_legacy_tag_field_with_configured_kind() {
        let config = EngineConfig { patch_kind: "ccsf_ops_v1".into(), ..EngineConfig::default() };
        let mut doc = json!({});
        let outcome = PatchApplier::new(&config).apply(
            &mut doc,
            &json!({"_type": "ccsf_ops_v1", "changes": [{"op": "set", "path": "/x", "value": 1}]}),
        );
        assert!(outcome.is_ok());
        assert_eq!(doc, json!({"x": 1}));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: set on a vehicle attribute always lands in [0, 100]
            #[test]
            fn prop_set_on_car_path_is_clamped(value in -1.0e6f64..1.0e6f64, attr in "[a-z_]{1,12}") {
                let mut doc = json!({"teams": [{"team_id": "rbr", "car": {}}]});
                let path = format!("/teams/rbr/car/{attr}");
                apply(&mut doc, json!([{"op": "set", "path": path, "value": value}]));
                let written = doc["teams"][0]["car"][attr.as_str()].as_f64().unwrap();
                prop_assert!((0.0..=100.0).contains(&written));
            }

            /// Property: two incs equal one inc of the sum while inside the range
            #[test]
            fn prop_inc_is_associative_inside_range(start in 0i64..=100, a in -50i64..=50, b in -50i64..=50) {
                prop_assume!((0..=100).contains(&(start + a)));
                prop_assume!((0..=100).contains(&(start + a + b)));

                let mut stepped = json!({"car": {"grip": start}});
                apply(&mut stepped, json!([{"op": "inc", "path": "/car/grip", "value": a}]));
                apply(&mut stepped, json!([{"op": "inc", "path": "/car/grip", "value": b}]));

                let mut summed = json!({"car": {"grip": start}});
                apply(&mut summed, json!([{"op": "inc", "path": "/car/grip", "value": a + b}]));

                prop_assert_eq!(stepped, summed);
            }

            /// Property: push always leaves a sequence behind
            #[test]
            fn prop_push_yields_sequence(
                existing in prop_oneof![
                    Just(json!(null)),
                    any::<i64>().prop_map(|n| json!(n)),
                    "[a-z]{0,8}".prop_map(|s| json!(s)),
                    Just(json!({"k": 1})),
                    Just(json!([1, 2])),
                ],
                absent in any::<bool>(),
            ) {
                let mut doc = if absent { json!({}) } else { json!({"log": existing.clone()}) };
                apply(&mut doc, json!([{"op": "push", "path": "log", "value": "entry"}]));
                let items = doc["log"].as_array().unwrap();
                prop_assert_eq!(items.last(), Some(&json!("entry")));
                let expected_len = if !absent && existing.is_array() { 3 } else { 1 };
                prop_assert_eq!(items.len(), expected_len);
            }
        }
    }
}
