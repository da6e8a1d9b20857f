use crate::model::{TargetObject, Value};
use crate::policy::EvaluateOptions;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::{RuleVerdict, Severity, VerdictStatus};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::datetime;

pub fn as_of() -> OffsetDateTime {
    datetime!(2026-10-01 00:00 UTC)
}

pub fn target(name: &str, fields: &[(&str, Value)]) -> TargetObject {
    let map: BTreeMap<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    TargetObject::new(name, map)
}

pub fn ctx_at(target: &TargetObject) -> RuleContext<'_> {
    RuleContext {
        target,
        as_of: as_of(),
    }
}

pub fn options() -> EvaluateOptions {
    EvaluateOptions::new(as_of())
}

pub fn noop_body(_: &RuleContext<'_>, _: &mut Outcomes) -> Result<(), RuleFault> {
    Ok(())
}

/// A valid declaration with a no-op body; metadata is leaked to satisfy the `'static` format.
pub fn decl(id: &'static str, severity: &'static str, category: &'static str) -> RuleDecl {
    let metadata: &'static [(&'static str, &'static str)] =
        Box::leak(vec![("severity", severity), ("category", category)].into_boxed_slice());
    RuleDecl {
        id,
        kind: None,
        when: None,
        body: noop_body,
        metadata,
    }
}

pub fn verdict(rule_id: &str, target: &str, status: VerdictStatus, severity: Severity) -> RuleVerdict {
    RuleVerdict {
        rule_id: rule_id.to_string(),
        target: target.to_string(),
        status,
        severity,
        category: "Test".to_string(),
        tags: BTreeMap::new(),
        outcomes: Vec::new(),
        fault: None,
        fingerprint: None,
    }
}
