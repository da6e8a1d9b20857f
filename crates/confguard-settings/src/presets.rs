use confguard_domain::Registry;
use confguard_types::Severity;
use std::collections::BTreeMap;

pub const PROFILES: [&str; 2] = ["strict", "baseline"];

/// Per-rule switch produced by a profile and adjusted by config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulePolicy {
    pub enabled: bool,
    pub severity: Severity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub profile: String,
    pub fail_on: Severity,
    pub rules: BTreeMap<String, RulePolicy>,
}

/// Preset profiles are opinionated defaults. Returns `None` for an unknown profile.
pub fn preset(profile: &str, registry: &Registry) -> Option<Preset> {
    match profile {
        "strict" => Some(build("strict", Severity::Low, Severity::Informational, registry)),
        "baseline" => Some(build("baseline", Severity::High, Severity::High, registry)),
        _ => None,
    }
}

fn build(profile: &str, fail_on: Severity, floor: Severity, registry: &Registry) -> Preset {
    let rules = registry
        .iter()
        .map(|rule| {
            let severity = rule.metadata().severity;
            let policy = RulePolicy {
                enabled: severity >= floor,
                severity,
            };
            (rule.id().to_string(), policy)
        })
        .collect();
    Preset {
        profile: profile.to_string(),
        fail_on,
        rules,
    }
}
