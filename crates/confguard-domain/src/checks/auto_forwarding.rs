use crate::assert;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_EXCHANGE_AUTO_FORWARDING,
    kind: Some(ids::KIND_EXCHANGE_REMOTE_DOMAIN),
    when: None,
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_DATA_LOSS_PREVENTION),
        (ids::META_SEVERITY, "critical"),
    ],
};

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    out.push(assert::has_field_value(
        ctx.target.fields(),
        "AutoForwardEnabled",
        false,
    ));
    Ok(())
}
