//! Use case orchestration for confguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings and domain
//! layers around file input. The CLI crate depends on this; it only handles argument parsing,
//! logging setup, and output.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod input;
mod list;
mod report;

pub use check::{CheckInput, CheckOutput, check_exit_code, run_check};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use input::{parse_targets, read_targets};
pub use list::{RuleListing, format_rule_list, run_list};
pub use report::{parse_report_json, report_json_schema, runtime_error_report, serialize_report};
