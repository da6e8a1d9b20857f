use crate::rule::{RuleDecl, RuleDefinition};
use std::collections::BTreeMap;
use thiserror::Error;

/// Malformed or conflicting rule declarations. Fatal to startup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("rule declaration has an empty identifier")]
    EmptyIdentifier,

    #[error("rule identifier '{id}' must not contain whitespace")]
    InvalidIdentifier { id: String },

    #[error("duplicate rule identifier '{id}'")]
    DuplicateIdentifier { id: String },

    #[error("rule '{id}' is missing required metadata '{key}'")]
    MissingMetadata { id: String, key: String },

    #[error("rule '{id}' declares metadata '{key}' more than once")]
    DuplicateMetadata { id: String, key: String },

    #[error("rule '{id}' has unknown severity '{value}' (expected critical|high|medium|low|informational)")]
    InvalidSeverity { id: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("rule '{id}' not found")]
    NotFound { id: String },
}

/// Rule definitions keyed by identifier, kept in registration order.
///
/// Built once at startup and only read during evaluation.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    rules: Vec<RuleDefinition>,
    index: BTreeMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from rule declarations, stopping at the first malformed one.
    pub fn load(decls: impl IntoIterator<Item = RuleDecl>) -> Result<Self, LoadError> {
        let mut registry = Registry::new();
        for decl in decls {
            registry.register(RuleDefinition::from_decl(decl)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, rule: RuleDefinition) -> Result<(), LoadError> {
        if self.index.contains_key(rule.id()) {
            return Err(LoadError::DuplicateIdentifier {
                id: rule.id().to_string(),
            });
        }
        self.index.insert(rule.id().to_string(), self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Result<&RuleDefinition, LookupError> {
        self.index
            .get(id)
            .map(|&i| &self.rules[i])
            .ok_or_else(|| LookupError::NotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every rule accepted by `filter`, in registration order.
    pub fn all_matching<F>(&self, filter: F) -> Vec<&RuleDefinition>
    where
        F: Fn(&RuleDefinition) -> bool,
    {
        self.rules.iter().filter(|r| filter(r)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{decl, noop_body};

    #[test]
    fn duplicate_identifier_fails_load() {
        let err = Registry::load([decl("a.one", "low", "Governance"), decl("a.one", "high", "Governance")])
            .expect_err("duplicate must fail");
        assert_eq!(
            err,
            LoadError::DuplicateIdentifier {
                id: "a.one".to_string()
            }
        );
    }

    #[test]
    fn lookup_finds_registered_rules_and_reports_missing() {
        let registry =
            Registry::load([decl("a.one", "low", "Governance"), decl("a.two", "high", "Backups")])
                .expect("load");
        assert_eq!(registry.lookup("a.two").expect("found").id(), "a.two");
        assert_eq!(
            registry.lookup("a.three").expect_err("missing"),
            LookupError::NotFound {
                id: "a.three".to_string()
            }
        );
    }

    #[test]
    fn all_matching_preserves_registration_order() {
        let registry = Registry::load([
            decl("z.last", "low", "Regular Backups"),
            decl("a.first", "high", "Governance"),
            decl("m.middle", "medium", "Regular Backups"),
        ])
        .expect("load");

        let ids: Vec<&str> = registry
            .all_matching(|r| r.metadata().category == "Regular Backups")
            .into_iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(ids, vec!["z.last", "m.middle"]);
    }

    #[test]
    fn register_keeps_existing_rule_on_conflict() {
        let mut registry = Registry::load([decl("a.one", "low", "Governance")]).expect("load");
        let dup = crate::rule::RuleDefinition::from_decl(crate::rule::RuleDecl {
            id: "a.one",
            kind: None,
            when: None,
            body: noop_body,
            metadata: &[("severity", "critical"), ("category", "Other")],
        })
        .expect("valid decl");
        assert!(registry.register(dup).is_err());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("a.one").expect("found").metadata().category,
            "Governance"
        );
    }
}
