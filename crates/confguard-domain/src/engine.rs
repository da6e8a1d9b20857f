use crate::fingerprint;
use crate::model::TargetObject;
use crate::policy::EvaluateOptions;
use crate::registry::Registry;
use crate::report::{AggregationFault, Aggregator, EvaluationReport};
use crate::rule::{Outcomes, RuleContext, RuleDefinition, RuleFault};
use confguard_types::{RuleVerdict, VerdictStatus};
use rayon::prelude::*;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

thread_local! {
    static IN_RULE: Cell<bool> = const { Cell::new(false) };
}

/// Whether the calling thread is currently inside a rule predicate or body.
///
/// A panic hook can use this to stay quiet about panics the engine turns into Error verdicts.
pub fn in_rule() -> bool {
    IN_RULE.with(Cell::get)
}

/// Evaluate every selected rule against every target object.
///
/// Objects are evaluated in parallel; rules within one object run in registry order. The
/// verdict sequence is ordered by object, then by rule, regardless of scheduling.
pub fn evaluate(
    registry: &Registry,
    targets: &[TargetObject],
    opts: &EvaluateOptions,
) -> Result<EvaluationReport, AggregationFault> {
    let rules = registry.all_matching(|r| opts.selects(r));
    tracing::debug!(
        rules = rules.len(),
        objects = targets.len(),
        parallelism = opts.parallelism,
        "evaluation started"
    );

    let mut aggregate = match opts.parallelism {
        1 => fold_sequential(&rules, targets, opts),
        0 => fold_parallel(&rules, targets, opts)?,
        n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(|| fold_parallel(&rules, targets, opts))?,
            Err(err) => {
                tracing::warn!(error = %err, "worker pool unavailable; evaluating sequentially");
                fold_sequential(&rules, targets, opts)
            }
        },
    };
    if opts.cancel.is_cancelled() {
        aggregate.mark_incomplete();
    }

    let report = aggregate.finish();
    tracing::info!(
        status = ?report.status,
        objects = report.summary.objects_evaluated,
        verdicts = report.summary.verdicts_total,
        fail = report.summary.statuses.fail,
        error = report.summary.statuses.error,
        incomplete = report.summary.incomplete,
        "evaluation finished"
    );
    Ok(report)
}

fn fold_sequential(
    rules: &[&RuleDefinition],
    targets: &[TargetObject],
    opts: &EvaluateOptions,
) -> Aggregator {
    targets.iter().fold(
        Aggregator::with_retention(opts.retain_verdicts),
        |agg, target| step(agg, rules, target, opts),
    )
}

fn fold_parallel(
    rules: &[&RuleDefinition],
    targets: &[TargetObject],
    opts: &EvaluateOptions,
) -> Result<Aggregator, AggregationFault> {
    targets
        .par_iter()
        .fold(
            || Aggregator::with_retention(opts.retain_verdicts),
            |agg, target| step(agg, rules, target, opts),
        )
        .map(Ok)
        .try_reduce(
            || Aggregator::with_retention(opts.retain_verdicts),
            Aggregator::merge,
        )
}

fn step(
    mut agg: Aggregator,
    rules: &[&RuleDefinition],
    target: &TargetObject,
    opts: &EvaluateOptions,
) -> Aggregator {
    if opts.cancel.is_cancelled() {
        agg.mark_incomplete();
        return agg;
    }
    for verdict in evaluate_object(rules, target, opts) {
        agg.push(verdict);
    }
    agg.record_object();
    agg
}

/// Evaluate one target object against `rules`, in the order given.
pub fn evaluate_object(
    rules: &[&RuleDefinition],
    target: &TargetObject,
    opts: &EvaluateOptions,
) -> Vec<RuleVerdict> {
    let ctx = RuleContext {
        target,
        as_of: opts.as_of,
    };
    tracing::debug!(target = target.name(), kind = target.kind(), "evaluating object");
    rules
        .iter()
        .map(|rule| evaluate_rule(rule, &ctx, opts))
        .collect()
}

fn evaluate_rule(rule: &RuleDefinition, ctx: &RuleContext<'_>, opts: &EvaluateOptions) -> RuleVerdict {
    let mut outcomes = Outcomes::new();

    let (status, fault) = match guarded(|| rule.applies(ctx)) {
        Err(fault) => (VerdictStatus::Error, Some(fault)),
        Ok(false) => (VerdictStatus::Skipped, None),
        Ok(true) => match guarded(|| rule.run(ctx, &mut outcomes)) {
            Err(fault) => (VerdictStatus::Error, Some(fault)),
            Ok(()) if outcomes.any_failed() => (VerdictStatus::Fail, None),
            Ok(()) => (VerdictStatus::Pass, None),
        },
    };

    if let Some(fault) = &fault {
        tracing::warn!(
            rule = rule.id(),
            target = ctx.target.name(),
            error = %fault,
            "rule faulted"
        );
    }

    let metadata = opts.effective_metadata(rule);
    let mut verdict = RuleVerdict {
        rule_id: rule.id().to_string(),
        target: ctx.target.name().to_string(),
        status,
        severity: metadata.severity,
        category: metadata.category,
        tags: metadata.tags,
        outcomes: outcomes.into_vec(),
        fault: fault.map(|f| f.to_string()),
        fingerprint: None,
    };
    verdict.fingerprint = Some(fingerprint::fingerprint(&verdict));
    verdict
}

/// Run a predicate or body, turning a panic into a [`RuleFault`].
fn guarded<T>(f: impl FnOnce() -> Result<T, RuleFault>) -> Result<T, RuleFault> {
    let outer = IN_RULE.with(|flag| flag.replace(true));
    let caught = panic::catch_unwind(AssertUnwindSafe(f));
    IN_RULE.with(|flag| flag.set(outer));
    match caught {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Err(RuleFault::Panic(message))
        }
    }
}
