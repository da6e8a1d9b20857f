use crate::assert;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_SHAREPOINT_VERSIONING_ENABLED,
    kind: None,
    when: Some(applies),
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_REGULAR_BACKUPS),
        (ids::META_SEVERITY, "medium"),
        ("control", "backup.versioning"),
    ],
};

fn applies(ctx: &RuleContext<'_>) -> Result<bool, RuleFault> {
    Ok(ctx.target.has_field("EnableVersioning"))
}

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    let fields = ctx.target.fields();
    if !out.push(assert::has_field_value(fields, "EnableVersioning", true)) {
        return Ok(());
    }
    if ctx.target.has_field("MajorVersionLimit") {
        out.push(assert::greater_or_equal(fields, "MajorVersionLimit", 100.0, None));
    }
    Ok(())
}
