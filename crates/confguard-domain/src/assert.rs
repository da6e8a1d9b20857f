//! Assertion library used by rule bodies.
//!
//! Every assertion is pure: it inspects a subject value and returns an [`AssertionOutcome`].
//! A missing field is a valid input that produces a failing outcome, never a panic.
//!
//! Field arguments are dotted paths into the subject; `"."` addresses the subject itself.

use crate::model::{Value, format_number};
use confguard_types::AssertionOutcome;
use regex::Regex;

/// Passes iff `condition` holds; `message` is reported either way.
pub fn create(condition: bool, message: impl Into<String>) -> AssertionOutcome {
    AssertionOutcome {
        passed: condition,
        message: message.into(),
        path: None,
    }
}

/// Attach the inspected field path to an outcome.
pub fn with_path(mut outcome: AssertionOutcome, path: &str) -> AssertionOutcome {
    outcome.path = Some(path.to_string());
    outcome
}

pub fn pass(message: Option<&str>) -> AssertionOutcome {
    create(true, message.unwrap_or("passed"))
}

pub fn fail(message: Option<&str>) -> AssertionOutcome {
    create(false, message.unwrap_or("failed"))
}

/// Presence, not truthiness: a field holding `null` or `false` is present.
pub fn has_field(subject: &Value, field: &str) -> AssertionOutcome {
    match lookup(subject, field) {
        Some(_) => at(field, true, format!("field '{field}' is present")),
        None => missing(field),
    }
}

/// Present and equal to `expected` (type-aware: `"true"` is not `true`).
pub fn has_field_value(subject: &Value, field: &str, expected: impl Into<Value>) -> AssertionOutcome {
    let expected = expected.into();
    match lookup(subject, field) {
        None => missing(field),
        Some(actual) if actual.same_as(&expected) => {
            at(field, true, format!("{} is {}", display_name(field), quoted(actual)))
        }
        Some(actual) => at(
            field,
            false,
            format!(
                "{} is {}, expected {}",
                display_name(field),
                quoted(actual),
                quoted(&expected)
            ),
        ),
    }
}

/// Passes iff the field is present, not null and not an empty sequence.
pub fn not_null(subject: &Value, field: &str) -> AssertionOutcome {
    match lookup(subject, field) {
        Some(v) if !v.is_empty_value() => {
            at(field, true, format!("{} is set", display_name(field)))
        }
        Some(_) => at(field, false, format!("{} is empty", display_name(field))),
        None => missing(field),
    }
}

/// Passes iff the field is absent, null or an empty sequence.
pub fn null(subject: &Value, field: &str) -> AssertionOutcome {
    match lookup(subject, field) {
        Some(v) if !v.is_empty_value() => at(
            field,
            false,
            format!("{} is {}, expected empty", display_name(field), quoted(v)),
        ),
        _ => at(field, true, format!("{} is empty", display_name(field))),
    }
}

pub fn greater_or_equal(
    subject: &Value,
    field: &str,
    threshold: f64,
    message: Option<&str>,
) -> AssertionOutcome {
    compare(subject, field, threshold, message, ">=", |a, t| a >= t)
}

pub fn less_or_equal(
    subject: &Value,
    field: &str,
    threshold: f64,
    message: Option<&str>,
) -> AssertionOutcome {
    compare(subject, field, threshold, message, "<=", |a, t| a <= t)
}

fn compare(
    subject: &Value,
    field: &str,
    threshold: f64,
    message: Option<&str>,
    op: &str,
    ok: fn(f64, f64) -> bool,
) -> AssertionOutcome {
    let Some(value) = lookup(subject, field) else {
        return missing(field);
    };
    let name = display_name(field);
    let Some(actual) = value.as_f64() else {
        return at(
            field,
            false,
            format!("{name} is not numeric ({})", value.type_name()),
        );
    };

    let detail = format!(
        "{name} is {}, expected {op} {}",
        format_number(actual),
        format_number(threshold)
    );
    let text = match message {
        Some(m) => format!("{m} ({detail})"),
        None => detail,
    };
    at(field, ok(actual, threshold), text)
}

/// Passes iff the field equals one of `allowed` (type-aware).
pub fn in_set<I, V>(subject: &Value, field: &str, allowed: I) -> AssertionOutcome
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    let Some(actual) = lookup(subject, field) else {
        return missing(field);
    };
    let name = display_name(field);
    if allowed.iter().any(|a| a.same_as(actual)) {
        return at(field, true, format!("{name} is {}", quoted(actual)));
    }
    let list = allowed.iter().map(quoted).collect::<Vec<_>>().join(", ");
    at(
        field,
        false,
        format!("{name} is {}, expected one of [{list}]", quoted(actual)),
    )
}

/// Passes iff the string field contains a match for `pattern`.
pub fn matches(subject: &Value, field: &str, pattern: &str) -> AssertionOutcome {
    regex_check(subject, field, pattern, true)
}

/// Passes iff the string field contains no match for `pattern`.
pub fn not_matches(subject: &Value, field: &str, pattern: &str) -> AssertionOutcome {
    regex_check(subject, field, pattern, false)
}

fn regex_check(subject: &Value, field: &str, pattern: &str, want_match: bool) -> AssertionOutcome {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => return at(field, false, format!("invalid pattern '{pattern}': {e}")),
    };
    let Some(value) = lookup(subject, field) else {
        return missing(field);
    };
    let name = display_name(field);
    let Some(text) = value.as_str() else {
        return at(
            field,
            false,
            format!("{name} is not a string ({})", value.type_name()),
        );
    };

    match (re.is_match(text), want_match) {
        (true, true) => at(field, true, format!("{name} matches '{pattern}'")),
        (false, false) => at(field, true, format!("{name} does not match '{pattern}'")),
        (false, true) => at(
            field,
            false,
            format!("{name} '{text}' does not match '{pattern}'"),
        ),
        (true, false) => at(
            field,
            false,
            format!("{name} '{text}' must not match '{pattern}'"),
        ),
    }
}

fn lookup<'a>(subject: &'a Value, field: &str) -> Option<&'a Value> {
    subject.resolve(field)
}

fn display_name(field: &str) -> &str {
    if field == "." || field.is_empty() {
        "value"
    } else {
        field
    }
}

fn quoted(v: &Value) -> String {
    match v {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

fn missing(field: &str) -> AssertionOutcome {
    at(field, false, format!("field '{field}' is missing"))
}

fn at(field: &str, passed: bool, message: String) -> AssertionOutcome {
    AssertionOutcome {
        passed,
        message,
        path: if field == "." || field.is_empty() {
            None
        } else {
            Some(field.to_string())
        },
    }
}
