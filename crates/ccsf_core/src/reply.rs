//! Generator reply boundary.
//!
//! The generator answers in free text that is supposed to wrap one JSON
//! object `{ "narration": "...", "ops": { "kind": "patch-v1", ... } }`.
//! Anything around the outermost braces (code fences, chatter) is ignored.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssistantReply {
    /// Text shown to the player
    pub narration: String,
    /// Raw patch batch, decoded later by the patch applier
    pub ops: Option<Value>,
}

/// Extract the JSON payload between the first `{` and the last `}`.
/// Returns `None` when there is no parseable object.
pub fn parse_reply(text: &str) -> Option<AssistantReply> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let payload: Value = match serde_json::from_str(&text[start..=end]) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Reply payload is not JSON: {e}");
            return None;
        }
    };
    let payload = payload.as_object()?;

    Some(AssistantReply {
        narration: payload
            .get("narration")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        ops: payload.get("ops").filter(|ops| !ops.is_null()).cloned(),
    })
}
