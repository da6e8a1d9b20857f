//! The `list` use case: enumerate registered rules.

use confguard_domain::Registry;
use confguard_types::{Severity, explain};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleListing {
    pub id: String,
    pub category: String,
    pub severity: Severity,
    pub title: Option<&'static str>,
}

/// Registered rules in registration order, optionally restricted to one category.
pub fn run_list(registry: &Registry, category: Option<&str>) -> Vec<RuleListing> {
    registry
        .all_matching(|rule| category.is_none_or(|c| rule.metadata().category == c))
        .into_iter()
        .map(|rule| RuleListing {
            id: rule.id().to_string(),
            category: rule.metadata().category.clone(),
            severity: rule.metadata().severity,
            title: explain::lookup_explanation(rule.id()).map(|e| e.title),
        })
        .collect()
}

/// One rule per line: `<id>  <severity>  <category>  <title>`.
pub fn format_rule_list(rules: &[RuleListing]) -> String {
    let id_width = rules.iter().map(|r| r.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for rule in rules {
        out.push_str(&format!(
            "{:<id_width$}  {:<13}  {}",
            rule.id,
            rule.severity.as_str(),
            rule.category
        ));
        if let Some(title) = rule.title {
            out.push_str(&format!("  {title}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use confguard_domain::checks::builtin_registry;
    use confguard_types::ids;

    #[test]
    fn lists_every_rule_in_registration_order() {
        let registry = builtin_registry().expect("builtin rules");
        let listing = run_list(&registry, None);
        assert_eq!(listing.len(), registry.len());
        assert_eq!(listing[0].id, ids::RULE_SHAREPOINT_RECYCLE_BIN_RETENTION);
        assert!(listing.iter().all(|r| r.title.is_some()));
    }

    #[test]
    fn category_restricts_listing() {
        let registry = builtin_registry().expect("builtin rules");
        let listing = run_list(&registry, Some(ids::CATEGORY_AUDIT_LOGGING));
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, ids::RULE_EXCHANGE_MAILBOX_AUDIT);

        assert!(run_list(&registry, Some("Nope")).is_empty());
    }

    #[test]
    fn format_aligns_columns() {
        let rules = vec![
            RuleListing {
                id: "a.b".to_string(),
                category: "X".to_string(),
                severity: Severity::High,
                title: Some("Title"),
            },
            RuleListing {
                id: "a.longer".to_string(),
                category: "Y".to_string(),
                severity: Severity::Low,
                title: None,
            },
        ];
        let text = format_rule_list(&rules);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a.b       high           X  Title");
        assert_eq!(lines[1], "a.longer  low            Y");
    }
}
