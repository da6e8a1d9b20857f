//! Config parsing and profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{ConfguardConfigV1, RuleConfig};
pub use presets::{PROFILES, RulePolicy};
pub use resolve::{Overrides, ResolvedConfig};

use confguard_domain::Registry;

/// Parse `confguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ConfguardConfigV1> {
    let cfg: ConfguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (profile + file + CLI overrides).
///
/// Rule ids named anywhere in the config must exist in `registry`.
pub fn resolve_config(
    cfg: ConfguardConfigV1,
    overrides: Overrides,
    registry: &Registry,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides, registry)
}
