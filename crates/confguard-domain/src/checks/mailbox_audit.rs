use crate::assert;
use crate::model::Value;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

const AGE_LIMIT_FIELD: &str = "AuditLogAgeLimit";
const MIN_AGE_LIMIT_DAYS: f64 = 90.0;

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_EXCHANGE_MAILBOX_AUDIT,
    kind: Some(ids::KIND_EXCHANGE_MAILBOX),
    when: None,
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_AUDIT_LOGGING),
        (ids::META_SEVERITY, "high"),
        ("control", "audit.mailbox"),
    ],
};

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    if !out.push(assert::has_field_value(ctx.target.fields(), "AuditEnabled", true)) {
        return Ok(());
    }

    // Every mailbox export carries the age limit; its absence means a malformed object.
    let raw = ctx.target.require(AGE_LIMIT_FIELD)?;
    let days = age_limit_days(raw).ok_or_else(|| RuleFault::TypeMismatch {
        path: AGE_LIMIT_FIELD.to_string(),
        expected: "number of days or d.hh:mm:ss",
        actual: raw.type_name(),
    })?;
    let outcome = assert::greater_or_equal(
        &Value::from(days),
        ".",
        MIN_AGE_LIMIT_DAYS,
        Some("audit records are not kept long enough"),
    );
    out.push(assert::with_path(outcome, AGE_LIMIT_FIELD));
    Ok(())
}

/// Accepts a day count or a `d.hh:mm:ss` time span.
fn age_limit_days(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    let span = v.as_str()?;
    let (days, _) = span.split_once('.')?;
    days.parse::<u32>().ok().map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_limit_accepts_numbers_and_time_spans() {
        assert_eq!(age_limit_days(&Value::from(90)), Some(90.0));
        assert_eq!(age_limit_days(&Value::from("180.00:00:00")), Some(180.0));
        assert_eq!(age_limit_days(&Value::from("soon")), None);
        assert_eq!(age_limit_days(&Value::from(true)), None);
    }
}
