//! The `check` use case: evaluate target objects against the rule set and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use confguard_domain::{CancellationToken, Registry, checks};
use confguard_settings::{ConfguardConfigV1, Overrides, ResolvedConfig};
use confguard_types::{ConfguardReport, ReportStatus, RunMeta, SCHEMA_REPORT_V1, Severity};
use time::OffsetDateTime;

use crate::report::tool_meta;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Target object file (JSON or JSON Lines).
    pub input_path: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Shared with a signal handler or caller that may stop the run early.
    pub cancel: CancellationToken,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: ConfguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: parse config, load targets, evaluate, produce report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let registry = checks::builtin_registry().context("load built-in rules")?;
    check_with_registry(input, &registry, started_at)
}

fn check_with_registry(
    input: CheckInput<'_>,
    registry: &Registry,
    started_at: OffsetDateTime,
) -> anyhow::Result<CheckOutput> {
    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        ConfguardConfigV1::default()
    } else {
        confguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved = confguard_settings::resolve_config(cfg, input.overrides.clone(), registry)
        .context("resolve config")?;
    tracing::debug!(
        profile = %resolved.profile,
        fail_on = %resolved.fail_on,
        parallelism = resolved.parallelism,
        "resolved config"
    );

    let targets = crate::input::read_targets(input.input_path)?;

    let mut opts = resolved.evaluate_options(started_at);
    opts.cancel = input.cancel.clone();
    let as_of = opts.as_of;

    let evaluated =
        confguard_domain::evaluate(registry, &targets, &opts).context("aggregate verdicts")?;

    let ended_at = OffsetDateTime::now_utc();
    let duration_ms = (ended_at - started_at).whole_milliseconds().max(0) as u64;

    let report = ConfguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at,
            ended_at: Some(ended_at),
            duration_ms: Some(duration_ms),
            as_of,
            profile: Some(resolved.profile.clone()),
        },
        status: evaluated.status,
        summary: evaluated.summary,
        verdicts: evaluated.verdicts,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

/// Map a report to an exit code: 0 = pass, 2 = failures at or above `fail_on`,
/// 3 = error verdicts, 4 = incomplete.
pub fn check_exit_code(report: &ConfguardReport, fail_on: Severity) -> i32 {
    if report.status == ReportStatus::Incomplete {
        4
    } else if report.summary.failures.at_least(fail_on) > 0 {
        2
    } else if report.summary.statuses.error > 0 {
        3
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confguard_types::{VerdictStatus, ids};

    const OBJECTS: &str = r#"[
  {"name": "contoso", "kind": "SharePoint.Tenant",
   "fields": {"RecycleBinRetentionPeriod": 15, "SharingCapability": "Disabled"}},
  {"name": "hr-site", "kind": "SharePoint.Site",
   "fields": {"EnableVersioning": true, "SharingCapability": "ExistingExternalUserSharingOnly"}}
]"#;

    fn write_input(dir: &tempfile::TempDir, text: &str) -> camino::Utf8PathBuf {
        let root = Utf8Path::from_path(dir.path()).expect("utf8 path");
        let path = root.join("objects.json");
        std::fs::write(&path, text).expect("write objects");
        path
    }

    fn input<'a>(path: &'a Utf8Path, config_text: &'a str) -> CheckInput<'a> {
        CheckInput {
            input_path: path,
            config_text,
            overrides: Overrides {
                as_of: Some("2026-10-01T00:00:00Z".to_string()),
                ..Overrides::default()
            },
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = write_input(&tmp, OBJECTS);

        let output = run_check(input(&path, "")).expect("run_check");
        assert_eq!(output.resolved_config.profile, "strict");
        assert_eq!(output.report.run.profile.as_deref(), Some("strict"));
        assert_eq!(output.report.summary.objects_evaluated, 2);
        assert_eq!(output.report.status, ReportStatus::Fail);

        let retention = output
            .report
            .verdicts
            .iter()
            .find(|v| v.rule_id == ids::RULE_SHAREPOINT_RECYCLE_BIN_RETENTION && v.target == "contoso")
            .expect("retention verdict");
        assert_eq!(retention.status, VerdictStatus::Fail);
        assert_eq!(check_exit_code(&output.report, output.resolved_config.fail_on), 2);
    }

    #[test]
    fn category_filter_limits_rules() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = write_input(&tmp, OBJECTS);

        let output = run_check(input(&path, "categories = [\"External Sharing\"]")).expect("run");
        assert!(
            output
                .report
                .verdicts
                .iter()
                .all(|v| v.category == ids::CATEGORY_EXTERNAL_SHARING)
        );
        assert_eq!(output.report.status, ReportStatus::Pass);
        assert_eq!(check_exit_code(&output.report, output.resolved_config.fail_on), 0);
    }

    #[test]
    fn fail_on_threshold_controls_exit_code() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = write_input(&tmp, OBJECTS);

        // The only failure is high severity.
        let output = run_check(input(&path, "fail_on = \"critical\"")).expect("run");
        assert_eq!(output.report.status, ReportStatus::Fail);
        assert_eq!(check_exit_code(&output.report, output.resolved_config.fail_on), 0);
    }

    #[test]
    fn cancelled_run_is_incomplete() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = write_input(&tmp, OBJECTS);

        let check = input(&path, "");
        check.cancel.cancel();
        let output = run_check(check).expect("run");
        assert_eq!(output.report.status, ReportStatus::Incomplete);
        assert!(output.report.summary.incomplete);
        assert_eq!(check_exit_code(&output.report, Severity::Low), 4);
    }

    #[test]
    fn invalid_config_is_an_error_with_context() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = write_input(&tmp, OBJECTS);

        let err = run_check(input(&path, "profile = 3")).expect_err("bad config");
        assert!(err.to_string().contains("parse config"));
    }

    #[test]
    fn error_verdicts_map_to_exit_code_3() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = write_input(
            &tmp,
            r#"[{"name":"ceo","kind":"Exchange.Mailbox","fields":{"AuditEnabled":true}}]"#,
        );

        let output = run_check(input(&path, "")).expect("run");
        assert_eq!(output.report.status, ReportStatus::Error);
        assert_eq!(check_exit_code(&output.report, Severity::Low), 3);
    }
}
