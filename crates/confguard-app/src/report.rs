use anyhow::Context;
use confguard_types::{
    AssertionOutcome, ConfguardReport, ReportStatus, ReportSummary, RuleVerdict, RunMeta,
    SCHEMA_REPORT_V1, Severity, ToolMeta, VerdictStatus, ids,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "confguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

pub fn serialize_report(report: &ConfguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<ConfguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }
    serde_json::from_value(value).context("parse confguard report")
}

/// JSON Schema for the report envelope.
pub fn report_json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ConfguardReport)).unwrap_or_default()
}

/// Report written when the tool itself fails before or during evaluation.
pub fn runtime_error_report(message: &str) -> ConfguardReport {
    let now = OffsetDateTime::now_utc();
    let verdict = RuleVerdict {
        rule_id: ids::RULE_TOOL_RUNTIME.to_string(),
        target: "confguard".to_string(),
        status: VerdictStatus::Error,
        severity: Severity::High,
        category: ids::CATEGORY_TOOL.to_string(),
        tags: BTreeMap::new(),
        outcomes: vec![AssertionOutcome {
            passed: false,
            message: "Fix the tool error and re-run confguard.".to_string(),
            path: None,
        }],
        fault: Some(message.to_string()),
        fingerprint: None,
    };

    let mut summary = ReportSummary {
        verdicts_total: 1,
        ..ReportSummary::default()
    };
    summary.statuses.record(verdict.status);
    summary.severities.record(verdict.severity);

    ConfguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at: now,
            ended_at: Some(now),
            duration_ms: Some(0),
            as_of: now,
            profile: None,
        },
        status: ReportStatus::Error,
        summary,
        verdicts: vec![verdict],
    }
}
