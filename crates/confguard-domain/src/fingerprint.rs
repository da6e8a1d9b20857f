use confguard_types::{RuleVerdict, VerdictStatus};
use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a verdict.
///
/// Identity fields:
/// - rule_id
/// - target name
/// - status
/// - messages of failing outcomes, in order
///
/// Passing outcome messages are excluded so that a verdict keeps its identity while the
/// compliant values around it change.
pub fn fingerprint_for_verdict(
    rule_id: &str,
    target: &str,
    status: VerdictStatus,
    failing_messages: &[&str],
) -> String {
    let mut parts = vec![rule_id, target, status.as_str()];
    parts.extend_from_slice(failing_messages);
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

pub fn fingerprint(verdict: &RuleVerdict) -> String {
    let failing: Vec<&str> = verdict
        .failing_outcomes()
        .map(|o| o.message.as_str())
        .collect();
    fingerprint_for_verdict(&verdict.rule_id, &verdict.target, verdict.status, &failing)
}
