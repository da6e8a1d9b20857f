use crate::model::ConfguardConfigV1;
use crate::presets::{self, PROFILES, RulePolicy};
use anyhow::Context;
use confguard_domain::{EvaluateOptions, Registry, RuleFilter};
use confguard_types::Severity;
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Values supplied on the command line; each wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub fail_on: Option<String>,
    pub parallelism: Option<usize>,
    pub as_of: Option<String>,
    /// Replaces the config file's category list when non-empty.
    pub categories: Vec<String>,
    /// Restrict the run to these rule ids, enabling them even if the profile does not.
    pub rules: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub profile: String,
    pub fail_on: Severity,
    pub parallelism: usize,
    /// `None` means "the instant the run starts".
    pub as_of: Option<OffsetDateTime>,
    pub rules: BTreeMap<String, RulePolicy>,
    pub filter: RuleFilter,
    pub severity_overrides: BTreeMap<String, Severity>,
}

impl ResolvedConfig {
    /// Engine options for one run; `now` is used when no fixed `as_of` was configured.
    pub fn evaluate_options(&self, now: OffsetDateTime) -> EvaluateOptions {
        let mut opts = EvaluateOptions::new(self.as_of.unwrap_or(now));
        opts.filter = self.filter.clone();
        opts.severity_overrides = self.severity_overrides.clone();
        opts.parallelism = self.parallelism;
        opts
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|(_, p)| p.enabled)
            .map(|(id, _)| id.as_str())
    }
}

pub fn resolve_config(
    cfg: ConfguardConfigV1,
    overrides: Overrides,
    registry: &Registry,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let Some(preset) = presets::preset(&profile, registry) else {
        anyhow::bail!(
            "unknown profile: {profile} (expected {})",
            PROFILES.join("|")
        );
    };
    let mut rules = preset.rules;

    // per-rule overrides
    for (rule_id, rc) in cfg.rules.iter() {
        let Some(entry) = rules.get_mut(rule_id) else {
            anyhow::bail!("unknown rule id in [rules]: {rule_id}");
        };
        if let Some(enabled) = rc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = rc.severity.as_deref() {
            entry.severity =
                parse_severity(sev).with_context(|| format!("invalid severity for {rule_id}"))?;
        }
    }

    let mut filter = RuleFilter::default();

    for rule_id in &overrides.rules {
        let Some(entry) = rules.get_mut(rule_id) else {
            anyhow::bail!("unknown rule id: {rule_id}");
        };
        entry.enabled = true;
        filter.include.insert(rule_id.clone());
    }

    filter.exclude = rules
        .iter()
        .filter(|(_, p)| !p.enabled)
        .map(|(id, _)| id.clone())
        .collect();

    let categories = if overrides.categories.is_empty() {
        cfg.categories
    } else {
        overrides.categories
    };
    let known: BTreeSet<&str> = registry
        .iter()
        .map(|r| r.metadata().category.as_str())
        .collect();
    for category in &categories {
        if !known.contains(category.as_str()) {
            anyhow::bail!("unknown category: {category}");
        }
    }
    filter.categories = categories.into_iter().collect();

    if let Some(min) = cfg.min_severity.as_deref() {
        filter.min_severity = Some(parse_severity(min).context("invalid min_severity")?);
    }

    let severity_overrides = registry
        .iter()
        .filter_map(|rule| {
            let policy = rules.get(rule.id())?;
            (policy.severity != rule.metadata().severity)
                .then(|| (rule.id().to_string(), policy.severity))
        })
        .collect();

    let fail_on = match overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        Some(v) => parse_severity(v).context("invalid fail_on")?,
        None => preset.fail_on,
    };

    let as_of = match overrides.as_of.as_deref().or(cfg.as_of.as_deref()) {
        Some(v) => Some(
            OffsetDateTime::parse(v, &Rfc3339)
                .with_context(|| format!("invalid as_of: {v} (expected RFC 3339)"))?,
        ),
        None => None,
    };

    Ok(ResolvedConfig {
        profile: preset.profile,
        fail_on,
        parallelism: overrides.parallelism.or(cfg.parallelism).unwrap_or(0),
        as_of,
        rules,
        filter,
        severity_overrides,
    })
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match Severity::parse(v) {
        Some(sev) => Ok(sev),
        None => anyhow::bail!(
            "unknown severity: {v} (expected critical|high|medium|low|informational)"
        ),
    }
}
