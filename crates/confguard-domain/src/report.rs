use confguard_types::{ReportStatus, ReportSummary, RuleVerdict, VerdictStatus};
use thiserror::Error;

/// Aggregation is a pure fold; a fault here means the inputs were inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AggregationFault {
    #[error("cannot merge a verdict-retaining aggregate with a counts-only aggregate")]
    MixedRetention,

    #[error("report summary counts {counted} verdicts but holds {held}")]
    InconsistentCounts { counted: u32, held: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationReport {
    pub status: ReportStatus,
    pub verdicts: Vec<RuleVerdict>,
    pub summary: ReportSummary,
}

impl EvaluationReport {
    /// Combine two reports, `self` first. Associative.
    pub fn merge(self, other: EvaluationReport) -> Result<EvaluationReport, AggregationFault> {
        let left = Aggregator::from_report(self)?;
        let right = Aggregator::from_report(other)?;
        Ok(left.merge(right)?.finish())
    }
}

/// Incremental fold from verdicts into an [`EvaluationReport`].
///
/// Folds over disjoint batches can be merged in batch order to get the same report as one
/// fold over the whole sequence.
#[derive(Clone, Debug)]
pub struct Aggregator {
    retain: bool,
    verdicts: Vec<RuleVerdict>,
    summary: ReportSummary,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            retain: true,
            verdicts: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    /// Tally only; verdicts are dropped after they are counted.
    pub fn counts_only() -> Self {
        Aggregator {
            retain: false,
            ..Aggregator::new()
        }
    }

    pub fn with_retention(retain: bool) -> Self {
        if retain {
            Aggregator::new()
        } else {
            Aggregator::counts_only()
        }
    }

    fn from_report(report: EvaluationReport) -> Result<Self, AggregationFault> {
        let counted = report.summary.verdicts_total;
        let retain = !(report.verdicts.is_empty() && counted > 0);
        if retain && report.verdicts.len() != counted as usize {
            return Err(AggregationFault::InconsistentCounts {
                counted,
                held: report.verdicts.len(),
            });
        }
        Ok(Aggregator {
            retain,
            verdicts: report.verdicts,
            summary: report.summary,
        })
    }

    pub fn push(&mut self, verdict: RuleVerdict) {
        let summary = &mut self.summary;
        summary.verdicts_total += 1;
        summary.statuses.record(verdict.status);
        summary.severities.record(verdict.severity);
        if verdict.status == VerdictStatus::Fail {
            summary.failures.record(verdict.severity);
        }
        if self.retain {
            self.verdicts.push(verdict);
        }
    }

    /// Count one fully evaluated target object.
    pub fn record_object(&mut self) {
        self.summary.objects_evaluated += 1;
    }

    pub fn mark_incomplete(&mut self) {
        self.summary.incomplete = true;
    }

    pub fn merge(mut self, other: Aggregator) -> Result<Aggregator, AggregationFault> {
        // An empty side carries no verdicts either way, so retention mismatches only matter
        // when both sides hold data.
        let self_empty = self.summary.verdicts_total == 0;
        let other_empty = other.summary.verdicts_total == 0;
        if self.retain != other.retain && !self_empty && !other_empty {
            return Err(AggregationFault::MixedRetention);
        }
        if self_empty {
            self.retain = other.retain;
        }

        let s = &mut self.summary;
        let o = &other.summary;
        s.objects_evaluated += o.objects_evaluated;
        s.verdicts_total += o.verdicts_total;
        s.statuses.merge(&o.statuses);
        s.severities.merge(&o.severities);
        s.failures.merge(&o.failures);
        s.incomplete |= o.incomplete;
        self.verdicts.extend(other.verdicts);
        Ok(self)
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn finish(self) -> EvaluationReport {
        EvaluationReport {
            status: overall_status(&self.summary),
            verdicts: self.verdicts,
            summary: self.summary,
        }
    }
}

/// Fold a verdict sequence into a report in one go.
pub fn aggregate(verdicts: impl IntoIterator<Item = RuleVerdict>) -> EvaluationReport {
    let mut agg = Aggregator::new();
    for v in verdicts {
        agg.push(v);
    }
    agg.finish()
}

fn overall_status(summary: &ReportSummary) -> ReportStatus {
    if summary.incomplete {
        ReportStatus::Incomplete
    } else if summary.statuses.fail > 0 {
        ReportStatus::Fail
    } else if summary.statuses.error > 0 {
        ReportStatus::Error
    } else {
        ReportStatus::Pass
    }
}
