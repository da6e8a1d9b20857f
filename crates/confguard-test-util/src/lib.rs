//! Shared test utilities for the confguard workspace.

use serde_json::Value;

const TIMESTAMP: &str = "__TIMESTAMP__";

/// Normalize non-deterministic JSON fields so two reports can be compared.
///
/// `tool.version` is replaced only on a root report envelope (`schema`, `tool`, `run`,
/// `status`, `verdicts`), so target data that happens to carry a `tool` key is left alone.
/// Wall-clock fields (`started_at`, `ended_at`, `duration_ms`) are blanked at any depth.
/// `as_of` is kept: it is an input to evaluation, not a measurement of it.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "run", "status", "verdicts"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope
            && let Some(tool_obj) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool_obj.contains_key("version")
        {
            tool_obj.insert("version".to_string(), Value::String("__VERSION__".to_string()));
        }
    }
    normalize_clock_recursive(&mut value);
    value
}

fn normalize_clock_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "ended_at"] {
                if let Some(v) = map.get_mut(key) {
                    *v = Value::String(TIMESTAMP.to_string());
                }
            }
            if let Some(v) = map.get_mut("duration_ms") {
                *v = Value::Number(0.into());
            }
            for val in map.values_mut() {
                normalize_clock_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_clock_recursive(val);
            }
        }
        _ => {}
    }
}
