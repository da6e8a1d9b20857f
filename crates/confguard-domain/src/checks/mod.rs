//! Built-in rule set.
//!
//! Each rule lives in its own module as a `DECL` in the rule source format; the registry
//! validates them at load time.

use crate::registry::{LoadError, Registry};
use crate::rule::RuleDecl;

mod admin_contacts;
mod auto_forwarding;
mod dmarc_enforced;
mod external_sharing;
mod mailbox_audit;
mod recycle_bin_retention;
mod versioning_enabled;


static DECLARATIONS: [RuleDecl; 7] = [
    recycle_bin_retention::DECL,
    versioning_enabled::DECL,
    external_sharing::DECL,
    mailbox_audit::DECL,
    auto_forwarding::DECL,
    dmarc_enforced::DECL,
    admin_contacts::DECL,
];

/// The built-in declarations, in registration order.
pub fn declarations() -> &'static [RuleDecl] {
    &DECLARATIONS
}

/// Registry holding the built-in rule set.
pub fn builtin_registry() -> Result<Registry, LoadError> {
    Registry::load(declarations().iter().copied())
}
