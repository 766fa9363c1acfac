use serde_json::Value;

use crate::Action;

/// Build an [`Action`] from the route name and the JSON request body.
///
/// Expected body: `{"payload":{...}}`. A missing or malformed body is treated
/// as an empty payload; unknown names map to [`Action::Unknown`].
pub fn parse_action(name: &str, body: &[u8]) -> Action {
    let payload = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("payload").cloned())
        .unwrap_or(Value::Null);

    match name {
        "draft_input" => Action::DraftInput(string_field(&payload, "value").unwrap_or_default()),
        "generate" => Action::Generate(string_field(&payload, "description")),
        _ => Action::Unknown,
    }
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key)?.as_str().map(str::to_string)
}
