use crate::assert;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

const ALLOWED_CAPABILITIES: [&str; 3] = [
    "Disabled",
    "ExistingExternalUserSharingOnly",
    "ExternalUserSharingOnly",
];

const LINK_EXPIRY_FIELD: &str = "RequireAnonymousLinksExpireInDays";

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_SHAREPOINT_EXTERNAL_SHARING,
    kind: None,
    when: Some(applies),
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_EXTERNAL_SHARING),
        (ids::META_SEVERITY, "high"),
    ],
};

fn applies(ctx: &RuleContext<'_>) -> Result<bool, RuleFault> {
    Ok(matches!(
        ctx.target.kind(),
        Some(ids::KIND_SHAREPOINT_TENANT) | Some(ids::KIND_SHAREPOINT_SITE)
    ) || ctx.target.has_field("SharingCapability"))
}

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    let fields = ctx.target.fields();
    out.push(assert::in_set(fields, "SharingCapability", ALLOWED_CAPABILITIES));

    // Zero or negative means anonymous links never expire.
    if ctx.target.has_field(LINK_EXPIRY_FIELD) {
        out.push(assert::greater_or_equal(
            fields,
            LINK_EXPIRY_FIELD,
            1.0,
            Some("anonymous links never expire"),
        ));
        out.push(assert::less_or_equal(fields, LINK_EXPIRY_FIELD, 30.0, None));
    }
    Ok(())
}
