//! Rule declarations and the immutable definitions the registry holds.

use crate::model::TargetObject;
use crate::registry::LoadError;
use confguard_types::{AssertionOutcome, Severity, ids};
use std::collections::BTreeMap;
use thiserror::Error;
use time::OffsetDateTime;

/// A fault raised while running a predicate or a rule body.
///
/// Faults are local to one (rule, object) pairing and become an `error` verdict.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleFault {
    #[error("missing field '{path}'")]
    MissingField { path: String },

    #[error("field '{path}' is {actual}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{0}")]
    Custom(String),

    #[error("rule panicked: {0}")]
    Panic(String),
}

/// What a predicate or body sees: the target and the instant the run evaluates against.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub target: &'a TargetObject,
    pub as_of: OffsetDateTime,
}

/// Ordered outcomes produced by one rule body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcomes {
    items: Vec<AssertionOutcome>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome and return whether it passed, so bodies can short-circuit.
    pub fn push(&mut self, outcome: AssertionOutcome) -> bool {
        let passed = outcome.passed;
        self.items.push(outcome);
        passed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn any_failed(&self) -> bool {
        self.items.iter().any(|o| !o.passed)
    }

    pub fn as_slice(&self) -> &[AssertionOutcome] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<AssertionOutcome> {
        self.items
    }
}

pub type Predicate = fn(&RuleContext<'_>) -> Result<bool, RuleFault>;
pub type Body = fn(&RuleContext<'_>, &mut Outcomes) -> Result<(), RuleFault>;

/// Rule source format, as written in the static rule set.
///
/// `metadata` must carry `category` and `severity`; every other pair becomes a tag.
#[derive(Clone, Copy, Debug)]
pub struct RuleDecl {
    pub id: &'static str,
    /// Only objects of this kind are considered; others are skipped.
    pub kind: Option<&'static str>,
    pub when: Option<Predicate>,
    pub body: Body,
    pub metadata: &'static [(&'static str, &'static str)],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMetadata {
    pub severity: Severity,
    pub category: String,
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct RuleDefinition {
    id: String,
    kind: Option<String>,
    when: Option<Predicate>,
    body: Body,
    metadata: RuleMetadata,
}

impl RuleDefinition {
    /// Validate a declaration and turn it into a definition.
    pub fn from_decl(decl: RuleDecl) -> Result<Self, LoadError> {
        let id = decl.id.trim();
        if id.is_empty() {
            return Err(LoadError::EmptyIdentifier);
        }
        if id.len() != decl.id.len() || id.chars().any(char::is_whitespace) {
            return Err(LoadError::InvalidIdentifier {
                id: decl.id.to_string(),
            });
        }

        let mut severity: Option<&str> = None;
        let mut category: Option<&str> = None;
        let mut tags = BTreeMap::new();
        for (key, value) in decl.metadata {
            let slot = match *key {
                ids::META_SEVERITY => &mut severity,
                ids::META_CATEGORY => &mut category,
                _ => {
                    if tags.insert(key.to_string(), value.to_string()).is_some() {
                        return Err(duplicate_key(id, key));
                    }
                    continue;
                }
            };
            if slot.replace(*value).is_some() {
                return Err(duplicate_key(id, key));
            }
        }

        let severity = severity.ok_or_else(|| missing_key(id, ids::META_SEVERITY))?;
        let severity = Severity::parse(severity).ok_or_else(|| LoadError::InvalidSeverity {
            id: id.to_string(),
            value: severity.to_string(),
        })?;
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| missing_key(id, ids::META_CATEGORY))?;

        Ok(RuleDefinition {
            id: id.to_string(),
            kind: decl.kind.map(str::to_string),
            when: decl.when,
            body: decl.body,
            metadata: RuleMetadata {
                severity,
                category: category.to_string(),
                tags,
            },
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    /// Kind filter, then the applicability predicate.
    pub fn applies(&self, ctx: &RuleContext<'_>) -> Result<bool, RuleFault> {
        if let Some(kind) = self.kind.as_deref()
            && ctx.target.kind() != Some(kind)
        {
            return Ok(false);
        }
        match self.when {
            Some(when) => when(ctx),
            None => Ok(true),
        }
    }

    pub fn run(&self, ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
        (self.body)(ctx, out)
    }
}

fn missing_key(id: &str, key: &str) -> LoadError {
    LoadError::MissingMetadata {
        id: id.to_string(),
        key: key.to_string(),
    }
}

fn duplicate_key(id: &str, key: &str) -> LoadError {
    LoadError::DuplicateMetadata {
        id: id.to_string(),
        key: key.to_string(),
    }
}
