use crate::rule::{RuleDefinition, RuleMetadata};
use confguard_types::Severity;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;

/// Tag predicate selecting which registered rules take part in a run.
///
/// Empty sets mean "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub min_severity: Option<Severity>,
    /// Every listed tag must be present with the given value.
    pub tags: BTreeMap<String, String>,
}

impl RuleFilter {
    pub fn category(category: impl Into<String>) -> Self {
        RuleFilter {
            categories: BTreeSet::from([category.into()]),
            ..RuleFilter::default()
        }
    }

    pub fn matches(&self, id: &str, metadata: &RuleMetadata) -> bool {
        if self.exclude.contains(id) {
            return false;
        }
        if !self.include.is_empty() && !self.include.contains(id) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&metadata.category) {
            return false;
        }
        if let Some(min) = self.min_severity
            && metadata.severity < min
        {
            return false;
        }
        self.tags
            .iter()
            .all(|(k, v)| metadata.tags.get(k).is_some_and(|actual| actual == v))
    }
}

/// Cooperative cancellation, checked between target objects.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug)]
pub struct EvaluateOptions {
    pub filter: RuleFilter,
    /// Per-rule severity replacing the declared one.
    pub severity_overrides: BTreeMap<String, Severity>,
    /// Instant time-dependent rules evaluate against. Fixed per run.
    pub as_of: OffsetDateTime,
    /// Worker threads for object-level parallelism; 0 = available parallelism.
    pub parallelism: usize,
    /// Keep every verdict in the report, or only the tallies.
    pub retain_verdicts: bool,
    pub cancel: CancellationToken,
}

impl EvaluateOptions {
    pub fn new(as_of: OffsetDateTime) -> Self {
        EvaluateOptions {
            filter: RuleFilter::default(),
            severity_overrides: BTreeMap::new(),
            as_of,
            parallelism: 0,
            retain_verdicts: true,
            cancel: CancellationToken::new(),
        }
    }

    /// Declared metadata with any severity override applied.
    pub fn effective_metadata(&self, rule: &RuleDefinition) -> RuleMetadata {
        let mut metadata = rule.metadata().clone();
        if let Some(sev) = self.severity_overrides.get(rule.id()) {
            metadata.severity = *sev;
        }
        metadata
    }

    pub fn selects(&self, rule: &RuleDefinition) -> bool {
        self.filter.matches(rule.id(), &self.effective_metadata(rule))
    }
}
