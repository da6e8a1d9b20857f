//! Loading target objects exported by an upstream collector.

use anyhow::Context;
use camino::Utf8Path;
use confguard_domain::TargetObject;

/// Read and parse a target object file.
pub fn read_targets(path: &Utf8Path) -> anyhow::Result<Vec<TargetObject>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read input {path}"))?;
    let targets = parse_targets(&text).with_context(|| format!("parse input {path}"))?;
    tracing::info!(path = %path, objects = targets.len(), "loaded target objects");
    Ok(targets)
}

/// Parse target objects from a JSON array, an `{ "objects": [...] }` document, a single
/// object, or JSON Lines.
pub fn parse_targets(text: &str) -> anyhow::Result<Vec<TargetObject>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => from_items(items),
        Ok(serde_json::Value::Object(mut map)) => match map.remove("objects") {
            Some(serde_json::Value::Array(items)) => from_items(items),
            Some(_) => anyhow::bail!("'objects' must be an array"),
            None => {
                let target = serde_json::from_value(serde_json::Value::Object(map))
                    .context("parse target object")?;
                Ok(vec![target])
            }
        },
        Ok(other) => anyhow::bail!(
            "expected an array or object of target objects, found {}",
            json_type(&other)
        ),
        // Not a single document; fall back to one object per line.
        Err(_) => parse_json_lines(text),
    }
}

fn from_items(items: Vec<serde_json::Value>) -> anyhow::Result<Vec<TargetObject>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).with_context(|| format!("parse target object #{i}"))
        })
        .collect()
}

fn parse_json_lines(text: &str) -> anyhow::Result<Vec<TargetObject>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("parse line {}", n + 1))
        })
        .collect()
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
