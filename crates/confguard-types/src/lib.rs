//! Stable DTOs and IDs used across the confguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable string IDs for rules, categories and metadata keys
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod receipt;

pub use explain::{ExamplePair, Explanation, lookup_explanation};
pub use receipt::{
    AssertionOutcome, ConfguardReport, ReportEnvelope, ReportStatus, ReportSummary, RuleVerdict,
    RunMeta, SCHEMA_REPORT_V1, Severity, SeverityCounts, StatusCounts, ToolMeta, VerdictStatus,
};
