//! Conformance tests for confguard.
//!
//! These tests validate:
//! 1. All rule IDs have explanations
//! 2. Every registered rule is documented
//! 3. Emitted reports validate against the report JSON Schema

use assert_cmd::Command;
use confguard_types::explain;
use serde_json::Value;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("confguard-cli should have parent")
        .parent()
        .expect("crates should have parent")
        .join("tests")
        .join("fixtures")
}

#[test]
fn all_rule_ids_have_explanations() {
    for rule_id in explain::all_rule_ids() {
        let exp = explain::lookup_explanation(rule_id)
            .unwrap_or_else(|| panic!("Rule ID '{rule_id}' has no explanation in registry"));
        assert!(!exp.title.is_empty(), "Rule ID '{rule_id}' has empty title");
        assert!(
            !exp.description.is_empty(),
            "Rule ID '{rule_id}' has empty description"
        );
        assert!(
            !exp.remediation.is_empty(),
            "Rule ID '{rule_id}' has empty remediation"
        );
        for example in [exp.examples.before, exp.examples.after] {
            serde_json::from_str::<Value>(example)
                .unwrap_or_else(|e| panic!("Rule ID '{rule_id}' example is not JSON: {e}"));
        }
    }
}

#[test]
fn every_registered_rule_is_documented() {
    let registry = confguard_domain::checks::builtin_registry().expect("builtin rules load");
    for rule in registry.iter() {
        assert!(
            explain::all_rule_ids().contains(&rule.id()),
            "Registered rule '{}' missing from explain registry",
            rule.id()
        );
    }
}

fn validate(report: &Value) {
    let schema = confguard_app::report_json_schema();
    let validator = jsonschema::validator_for(&schema).expect("report schema compiles");
    let errors: Vec<String> = validator.iter_errors(report).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "schema violations: {errors:#?}");
}

#[test]
fn emitted_reports_match_schema() {
    let cases = [
        ("clean_tenant", "objects.json", 0),
        ("backups_failing", "objects.json", 2),
        ("audit_gaps", "objects.jsonl", 3),
    ];
    for (name, file, code) in cases {
        let tmp = tempfile::tempdir().unwrap();
        let report_out = tmp.path().join("report.json");
        let input = fixtures_dir().join(name).join(file);

        #[allow(deprecated)]
        Command::cargo_bin("confguard")
            .unwrap()
            .current_dir(tmp.path())
            .args(["check", "--as-of", "2026-10-01T00:00:00Z", "--input"])
            .arg(&input)
            .arg("--report-out")
            .arg(&report_out)
            .assert()
            .code(code);

        let text = std::fs::read_to_string(&report_out).unwrap();
        validate(&serde_json::from_str(&text).unwrap());
    }
}

#[test]
fn runtime_error_report_matches_schema() {
    let report = confguard_app::runtime_error_report("boom");
    validate(&serde_json::to_value(&report).unwrap());
}
