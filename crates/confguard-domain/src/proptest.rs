//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Skipped and vacuous verdicts
//! - Deterministic, schedule-independent evaluation
//! - Aggregation merge laws
//! - Fault isolation between rules

use crate::assert;
use crate::engine::{evaluate, evaluate_object};
use crate::model::{TargetObject, Value};
use crate::registry::Registry;
use crate::report::{Aggregator, EvaluationReport, aggregate};
use crate::rule::{Body, Outcomes, Predicate, RuleContext, RuleDecl, RuleFault};
use crate::test_support::{options, verdict};
use confguard_types::{RuleVerdict, Severity, VerdictStatus};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i32..1000).prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

fn arb_target() -> impl Strategy<Value = TargetObject> {
    (
        "[a-z][a-z0-9-]{0,11}",
        prop::collection::btree_map("[A-C]", arb_value(), 0..4),
    )
        .prop_map(|(name, fields): (String, BTreeMap<String, Value>)| {
            TargetObject::new(name, fields)
        })
}

fn arb_targets() -> impl Strategy<Value = Vec<TargetObject>> {
    prop::collection::vec(arb_target(), 0..24)
}

fn arb_status() -> impl Strategy<Value = VerdictStatus> {
    prop_oneof![
        Just(VerdictStatus::Pass),
        Just(VerdictStatus::Fail),
        Just(VerdictStatus::Skipped),
        Just(VerdictStatus::Error),
    ]
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

fn arb_report() -> impl Strategy<Value = EvaluationReport> {
    prop::collection::vec(("[a-z]{1,4}", arb_status(), arb_severity()), 0..12).prop_map(|rows| {
        aggregate(
            rows.into_iter()
                .map(|(id, status, severity)| verdict(&id, "t", status, severity)),
        )
    })
}

// ============================================================================
// Rule bodies used by the properties
// ============================================================================

fn never(_: &RuleContext<'_>) -> Result<bool, RuleFault> {
    Ok(false)
}

fn records_nothing(_: &RuleContext<'_>, _: &mut Outcomes) -> Result<(), RuleFault> {
    Ok(())
}

fn checks_b(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    out.push(assert::not_null(ctx.target.fields(), "B"));
    out.push(assert::greater_or_equal(ctx.target.fields(), "A", 0.0, None));
    Ok(())
}

fn panics_on_a(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    out.push(assert::pass(None));
    if ctx.target.has_field("A") {
        panic!("unexpected A");
    }
    Ok(())
}

fn faults_without_c(ctx: &RuleContext<'_>, _: &mut Outcomes) -> Result<(), RuleFault> {
    ctx.target.require("C").map(|_| ())
}

fn decl(id: &'static str, when: Option<Predicate>, body: Body) -> RuleDecl {
    RuleDecl {
        id,
        kind: None,
        when,
        body,
        metadata: &[("severity", "medium"), ("category", "Test")],
    }
}

fn registry(decls: &[RuleDecl]) -> Registry {
    Registry::load(decls.iter().copied()).expect("valid declarations")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn false_predicate_always_yields_skipped_without_outcomes(targets in arb_targets()) {
        let registry = registry(&[decl("p.never", Some(never), checks_b)]);
        let report = evaluate(&registry, &targets, &options()).expect("evaluate");

        prop_assert_eq!(report.verdicts.len(), targets.len());
        for v in &report.verdicts {
            prop_assert_eq!(v.status, VerdictStatus::Skipped);
            prop_assert!(v.outcomes.is_empty());
        }
    }

    #[test]
    fn rule_without_assertions_always_passes(targets in arb_targets()) {
        let registry = registry(&[decl("p.vacuous", None, records_nothing)]);
        let report = evaluate(&registry, &targets, &options()).expect("evaluate");

        prop_assert!(report.verdicts.iter().all(|v| v.status == VerdictStatus::Pass));
        prop_assert_eq!(report.summary.statuses.pass as usize, targets.len());
    }

    #[test]
    fn evaluation_is_deterministic_and_schedule_independent(targets in arb_targets()) {
        let registry = registry(&[
            decl("p.check", None, checks_b),
            decl("p.panics", None, panics_on_a),
            decl("p.faults", None, faults_without_c),
        ]);

        let mut sequential = options();
        sequential.parallelism = 1;
        let mut parallel = options();
        parallel.parallelism = 4;

        let first = evaluate(&registry, &targets, &sequential).expect("sequential");
        let again = evaluate(&registry, &targets, &sequential).expect("sequential again");
        let pooled = evaluate(&registry, &targets, &parallel).expect("parallel");

        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &pooled);

        let order: Vec<(&str, &str)> = first
            .verdicts
            .iter()
            .map(|v| (v.target.as_str(), v.rule_id.as_str()))
            .collect();
        let expected: Vec<(&str, &str)> = targets
            .iter()
            .flat_map(|t| {
                ["p.check", "p.panics", "p.faults"]
                    .into_iter()
                    .map(move |id| (t.name(), id))
            })
            .collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn faulting_rule_does_not_change_neighbouring_verdicts(target in arb_target()) {
        let alone = registry(&[decl("p.check", None, checks_b)]);
        let crowded = registry(&[
            decl("p.panics", None, panics_on_a),
            decl("p.check", None, checks_b),
            decl("p.faults", None, faults_without_c),
        ]);

        let solo_rules = alone.all_matching(|_| true);
        let crowd_rules = crowded.all_matching(|_| true);
        let solo = evaluate_object(&solo_rules, &target, &options());
        let crowd = evaluate_object(&crowd_rules, &target, &options());

        prop_assert_eq!(&solo[0], &crowd[1]);
        if target.has_field("A") {
            prop_assert_eq!(crowd[0].status, VerdictStatus::Error);
        }
    }

    #[test]
    fn report_merge_is_associative(a in arb_report(), b in arb_report(), c in arb_report()) {
        let left = a.clone().merge(b.clone()).and_then(|ab| ab.merge(c.clone())).expect("left");
        let right = b.merge(c).and_then(|bc| a.merge(bc)).expect("right");
        prop_assert_eq!(left, right);
    }

    #[test]
    fn batched_fold_equals_single_fold(
        rows in prop::collection::vec((arb_status(), arb_severity()), 0..40),
        split in 0usize..40,
    ) {
        let verdicts: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, (status, severity))| verdict(&format!("r{i}"), "t", *status, *severity))
            .collect();
        let split = split.min(verdicts.len());

        let whole = aggregate(verdicts.clone());

        let mut head = Aggregator::new();
        let mut tail = Aggregator::new();
        for (i, v) in verdicts.into_iter().enumerate() {
            if i < split { head.push(v) } else { tail.push(v) }
        }
        let batched = head.merge(tail).expect("merge").finish();

        prop_assert_eq!(whole, batched);
    }

    #[test]
    fn merge_with_empty_report_is_identity(a in arb_report()) {
        let empty = aggregate(Vec::<RuleVerdict>::new());
        prop_assert_eq!(a.clone().merge(empty.clone()).expect("right identity"), a.clone());
        prop_assert_eq!(empty.merge(a.clone()).expect("left identity"), a);
    }
}
