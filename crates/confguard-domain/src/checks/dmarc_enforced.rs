use crate::assert;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

const RECORD_FIELD: &str = "DmarcRecord";

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_DNS_DMARC_ENFORCED,
    kind: None,
    when: Some(applies),
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_EMAIL_AUTHENTICATION),
        (ids::META_SEVERITY, "medium"),
    ],
};

fn applies(ctx: &RuleContext<'_>) -> Result<bool, RuleFault> {
    Ok(ctx.target.has_field(RECORD_FIELD))
}

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    let fields = ctx.target.fields();
    if !out.push(assert::matches(fields, RECORD_FIELD, r"^v=DMARC1\s*;")) {
        return Ok(());
    }
    out.push(assert::not_matches(fields, RECORD_FIELD, r"(?i)(^|;)\s*p\s*=\s*none\b"));
    Ok(())
}
