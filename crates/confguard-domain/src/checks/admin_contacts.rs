use crate::assert;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_TENANT_ADMIN_CONTACTS,
    kind: Some(ids::KIND_TENANT_ORGANIZATION),
    when: None,
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_GOVERNANCE),
        (ids::META_SEVERITY, "informational"),
    ],
};

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    out.push(assert::not_null(
        ctx.target.fields(),
        "TechnicalNotificationMails",
    ));
    Ok(())
}
