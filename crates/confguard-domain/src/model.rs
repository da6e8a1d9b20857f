use crate::rule::RuleFault;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Schema-less field value of an audited configuration object.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Timestamp(OffsetDateTime),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numbers, and strings that parse as numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamps, and strings in RFC 3339 form.
    pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::String(s) => OffsetDateTime::parse(s, &Rfc3339).ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Null or an empty sequence.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Resolve a dotted field path. `"."` (or an empty path) is the value itself.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        if path == "." || path.is_empty() {
            return Some(self);
        }
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Type-aware equality: values of different types are never equal.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_as(vb))
            }
            _ => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if is_integral(*n) {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => t
                .format(&Rfc3339)
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if is_integral(n) {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// The configuration entity being audited (a site, a mailbox, a tenant policy).
///
/// Fields are always held as a mapping so that assertions can address the whole object
/// as a [`Value`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TargetRecord", into = "TargetRecord")]
pub struct TargetObject {
    name: String,
    kind: Option<String>,
    fields: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TargetRecord {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "type")]
    kind: Option<String>,
    #[serde(default, alias = "properties")]
    fields: BTreeMap<String, Value>,
}

impl From<TargetRecord> for TargetObject {
    fn from(r: TargetRecord) -> Self {
        TargetObject {
            name: r.name,
            kind: r.kind,
            fields: Value::Object(r.fields),
        }
    }
}

impl From<TargetObject> for TargetRecord {
    fn from(t: TargetObject) -> Self {
        let fields = match t.fields {
            Value::Object(map) => map,
            _ => BTreeMap::new(),
        };
        TargetRecord {
            name: t.name,
            kind: t.kind,
            fields,
        }
    }
}

impl TargetObject {
    pub fn new(name: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        TargetObject {
            name: name.into(),
            kind: None,
            fields: Value::Object(fields),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// All fields as a mapping value.
    pub fn fields(&self) -> &Value {
        &self.fields
    }

    pub fn field(&self, path: &str) -> Option<&Value> {
        if path == "." || path.is_empty() {
            return None;
        }
        self.fields.resolve(path)
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.field(path).is_some()
    }

    /// Access a field that the rule assumes is present.
    pub fn require(&self, path: &str) -> Result<&Value, RuleFault> {
        self.field(path).ok_or_else(|| RuleFault::MissingField {
            path: path.to_string(),
        })
    }

    pub fn require_bool(&self, path: &str) -> Result<bool, RuleFault> {
        let v = self.require(path)?;
        v.as_bool().ok_or_else(|| mismatch(path, "bool", v))
    }

    pub fn require_f64(&self, path: &str) -> Result<f64, RuleFault> {
        let v = self.require(path)?;
        v.as_f64().ok_or_else(|| mismatch(path, "number", v))
    }

    pub fn require_str(&self, path: &str) -> Result<&str, RuleFault> {
        let v = self.require(path)?;
        v.as_str().ok_or_else(|| mismatch(path, "string", v))
    }

    pub fn require_timestamp(&self, path: &str) -> Result<OffsetDateTime, RuleFault> {
        let v = self.require(path)?;
        v.as_timestamp().ok_or_else(|| mismatch(path, "timestamp", v))
    }
}

fn mismatch(path: &str, expected: &'static str, actual: &Value) -> RuleFault {
    RuleFault::TypeMismatch {
        path: path.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> TargetObject {
        serde_json::from_value(json!({
            "name": "hr",
            "type": "SharePoint.Site",
            "properties": {
                "Url": "https://contoso/sites/hr",
                "Sharing": { "Capability": "Disabled" },
                "Owners": [],
                "Retention": "45",
                "Created": "2024-05-01T10:00:00Z"
            }
        }))
        .expect("target object")
    }

    #[test]
    fn target_object_accepts_aliases_and_resolves_nested_paths() {
        let t = site();
        assert_eq!(t.kind(), Some("SharePoint.Site"));
        assert_eq!(
            t.field("Sharing.Capability").and_then(Value::as_str),
            Some("Disabled")
        );
        assert!(t.field("Sharing.Missing").is_none());
        assert!(t.field(".").is_none());
    }

    #[test]
    fn empty_value_covers_null_and_empty_sequence_only() {
        assert!(Value::Null.is_empty_value());
        assert!(Value::Array(Vec::new()).is_empty_value());
        assert!(!Value::from("").is_empty_value());
        assert!(!Value::from(false).is_empty_value());
    }

    #[test]
    fn require_reports_missing_and_mismatched_fields() {
        let t = site();
        assert_eq!(t.require_f64("Retention").expect("numeric string"), 45.0);
        assert!(t.require_timestamp("Created").is_ok());
        assert!(matches!(
            t.require("Nope"),
            Err(RuleFault::MissingField { .. })
        ));
        assert!(matches!(
            t.require_bool("Url"),
            Err(RuleFault::TypeMismatch {
                expected: "bool",
                actual: "string",
                ..
            })
        ));
    }

    #[test]
    fn same_as_is_type_aware() {
        assert!(Value::from(30).same_as(&Value::from(30.0)));
        assert!(!Value::from("30").same_as(&Value::from(30)));
        assert!(!Value::from(true).same_as(&Value::from("true")));
    }

    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(Value::from(15).to_string(), "15");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn target_object_round_trips_through_json() {
        let t = site();
        let json = serde_json::to_value(&t).expect("serialize");
        assert_eq!(json["kind"], "SharePoint.Site");
        let back: TargetObject = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.name(), "hr");
        assert_eq!(back.field("Retention"), t.field("Retention"));
    }
}
