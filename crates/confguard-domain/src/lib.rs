//! Pure rule evaluation (no IO).
//!
//! Input: a registry of rule definitions and target objects fetched elsewhere.
//! Output: per-rule verdicts folded into an evaluation report.

#![forbid(unsafe_code)]

pub mod assert;
pub mod checks;
pub mod model;
pub mod policy;
pub mod registry;
pub mod report;
pub mod rule;

mod engine;
mod fingerprint;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{evaluate, evaluate_object, in_rule};
pub use model::{TargetObject, Value};
pub use policy::{CancellationToken, EvaluateOptions, RuleFilter};
pub use registry::{LoadError, LookupError, Registry};
pub use report::{AggregationFault, Aggregator, EvaluationReport};
pub use rule::{Body, Outcomes, Predicate, RuleContext, RuleDecl, RuleDefinition, RuleFault, RuleMetadata};
