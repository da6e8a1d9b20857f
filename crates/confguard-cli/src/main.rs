//! CLI entry point for confguard.
//!
//! This module is intentionally thin: it handles argument parsing, logging setup, I/O, and exit
//! codes. All business logic lives in the `confguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use confguard_app::{
    CheckInput, ExplainOutput, check_exit_code, format_rule_list, run_check, run_explain,
    run_list, runtime_error_report, serialize_report,
};
use confguard_domain::CancellationToken;
use confguard_settings::Overrides;
use confguard_types::ConfguardReport;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CONFGUARD_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "confguard",
    version,
    about = "Compliance rule checks for exported tenant configuration"
)]
struct Cli {
    /// Path to confguard config TOML (missing file = defaults).
    #[arg(long, default_value = "confguard.toml", global = true)]
    config: Utf8PathBuf,

    /// Log filter (e.g. `info`, `confguard_domain=debug`). Falls back to $CONFGUARD_LOG, then `warn`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate target objects and write the JSON report.
    Check {
        /// Target objects: JSON array, `{"objects": [...]}`, or JSON Lines.
        #[arg(long)]
        input: Utf8PathBuf,

        /// Override profile (strict|baseline).
        #[arg(long)]
        profile: Option<String>,

        /// Minimum severity of a failing verdict that fails the run.
        #[arg(long)]
        fail_on: Option<String>,

        /// Only evaluate rules in this category (repeatable).
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Only evaluate this rule id (repeatable).
        #[arg(long = "rule")]
        rules: Vec<String>,

        /// Worker threads; 0 = available parallelism, 1 = sequential.
        #[arg(long)]
        parallelism: Option<usize>,

        /// Fixed RFC 3339 evaluation instant for time-dependent rules.
        #[arg(long)]
        as_of: Option<String>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/confguard/report.json")]
        report_out: Utf8PathBuf,
    },

    /// List registered rules.
    List {
        /// Only list rules in this category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Explain a rule id with remediation guidance.
    Explain {
        /// The rule id (e.g., "sharepoint.recycle_bin_retention") to explain.
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    init_panic_hook();

    match cli.cmd {
        Commands::Check {
            input,
            profile,
            fail_on,
            categories,
            rules,
            parallelism,
            as_of,
            report_out,
        } => {
            let overrides = Overrides {
                profile,
                fail_on,
                parallelism,
                as_of,
                categories,
                rules,
            };
            cmd_check(&cli.config, &input, overrides, &report_out)
        }
        Commands::List { category } => cmd_list(category.as_deref()),
        Commands::Explain { identifier } => cmd_explain(&identifier),
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Route panics through tracing. Panics raised inside rule code are already reported as
/// Error verdicts, so they only show up at debug level.
fn init_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if confguard_domain::in_rule() {
            tracing::debug!(panic = %info, "rule panicked");
            return;
        }
        tracing::error!(panic = %info, "unexpected panic");
        default_hook(info);
    }));
}

/// Cancel `token` on the first Ctrl+C so the run stops early and still writes a report.
fn cancel_on_interrupt(token: CancellationToken) {
    let spawned = std::thread::Builder::new()
        .name("confguard-interrupt".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::warn!(error = %err, "interrupt handling unavailable");
                    return;
                }
            };
            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => {
                    tracing::warn!("interrupted; writing a partial report");
                    token.cancel();
                }
                Err(err) => tracing::warn!(error = %err, "could not listen for interrupts"),
            }
        });
    if let Err(err) = spawned {
        tracing::warn!(error = %err, "interrupt handling unavailable");
    }
}

fn cmd_check(
    config: &Utf8Path,
    input: &Utf8Path,
    overrides: Overrides,
    report_out: &Utf8Path,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    match check_to_file(config, input, overrides, report_out, cancel) {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            if let Err(write_err) = write_report_file(report_out, &report) {
                tracing::warn!(error = %format!("{write_err:#}"), "could not write error report");
            }
            eprintln!("confguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Run a check and write its report. Returns the exit code for the report.
fn check_to_file(
    config: &Utf8Path,
    input: &Utf8Path,
    overrides: Overrides,
    report_out: &Utf8Path,
    cancel: CancellationToken,
) -> anyhow::Result<i32> {
    // Load config if present; missing file is allowed (defaults apply).
    let cfg_text = match std::fs::read_to_string(config) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config, "no config file; using defaults");
            String::new()
        }
        Err(err) => return Err(anyhow::Error::new(err).context(format!("read config {config}"))),
    };

    let check = CheckInput {
        input_path: input,
        config_text: &cfg_text,
        overrides,
        cancel,
    };
    let output = run_check(check)?;

    write_report_file(report_out, &output.report).context("write report json")?;

    let summary = &output.report.summary;
    eprintln!(
        "confguard: {:?} ({} objects, {} pass, {} fail, {} error, {} skipped)",
        output.report.status,
        summary.objects_evaluated,
        summary.statuses.pass,
        summary.statuses.fail,
        summary.statuses.error,
        summary.statuses.skipped,
    );

    Ok(check_exit_code(&output.report, output.resolved_config.fail_on))
}

fn write_report_file(path: &Utf8Path, report: &ConfguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    let data = serialize_report(report)?;
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))?;
    Ok(())
}

fn cmd_list(category: Option<&str>) -> anyhow::Result<()> {
    let registry = confguard_domain::checks::builtin_registry().context("load built-in rules")?;
    print!("{}", format_rule_list(&run_list(&registry, category)));
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", confguard_app::format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_rule_ids,
        } => {
            eprint!(
                "{}",
                confguard_app::format_not_found(&identifier, available_rule_ids)
            );
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confguard_types::ReportStatus;

    const TENANT: &str = r#"[{"name":"contoso","kind":"SharePoint.Tenant",
        "fields":{"RecycleBinRetentionPeriod":15}}]"#;

    #[test]
    fn interrupted_check_writes_incomplete_report() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = Utf8Path::from_path(tmp.path()).expect("utf8 path");
        let input = root.join("objects.json");
        std::fs::write(&input, TENANT).expect("write objects");
        let report_out = root.join("out").join("report.json");

        let cancel = CancellationToken::new();
        cancel.cancel();
        let code = check_to_file(
            &root.join("confguard.toml"),
            &input,
            Overrides::default(),
            &report_out,
            cancel,
        )
        .expect("check");
        assert_eq!(code, 4);

        let text = std::fs::read_to_string(&report_out).expect("read report");
        let report = confguard_app::parse_report_json(&text).expect("parse report");
        assert_eq!(report.status, ReportStatus::Incomplete);
        assert!(report.summary.incomplete);
        assert_eq!(report.summary.objects_evaluated, 0);
        assert!(report.verdicts.is_empty());
    }

    #[test]
    fn uncancelled_check_reports_failures() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = Utf8Path::from_path(tmp.path()).expect("utf8 path");
        let input = root.join("objects.json");
        std::fs::write(&input, TENANT).expect("write objects");
        let report_out = root.join("report.json");

        let code = check_to_file(
            &root.join("confguard.toml"),
            &input,
            Overrides::default(),
            &report_out,
            CancellationToken::new(),
        )
        .expect("check");
        assert_eq!(code, 2);
        assert!(report_out.exists());
    }
}
