use crate::assert;
use crate::rule::{Outcomes, RuleContext, RuleDecl, RuleFault};
use confguard_types::ids;

const RETENTION_FIELD: &str = "RecycleBinRetentionPeriod";
const BACKUP_TEST_FIELD: &str = "LastBackupTest";

const MIN_RETENTION_DAYS: f64 = 30.0;
const BACKUP_TEST_INTERVAL_DAYS: i64 = 90;

pub const DECL: RuleDecl = RuleDecl {
    id: ids::RULE_SHAREPOINT_RECYCLE_BIN_RETENTION,
    kind: None,
    when: Some(applies),
    body: run,
    metadata: &[
        (ids::META_CATEGORY, ids::CATEGORY_REGULAR_BACKUPS),
        (ids::META_SEVERITY, "high"),
        ("control", "backup.retention"),
    ],
};

fn applies(ctx: &RuleContext<'_>) -> Result<bool, RuleFault> {
    Ok(ctx.target.kind() == Some(ids::KIND_SHAREPOINT_TENANT)
        || ctx.target.has_field(RETENTION_FIELD))
}

fn run(ctx: &RuleContext<'_>, out: &mut Outcomes) -> Result<(), RuleFault> {
    out.push(assert::greater_or_equal(
        ctx.target.fields(),
        RETENTION_FIELD,
        MIN_RETENTION_DAYS,
        Some("recycle bin retention is too short"),
    ));

    if !ctx.target.has_field(BACKUP_TEST_FIELD) {
        return Ok(());
    }

    // A past-due quarterly test fails; it is not downgraded to informational.
    let last = ctx.target.require_timestamp(BACKUP_TEST_FIELD)?;
    let age_days = (ctx.as_of - last).whole_days();
    let outcome = assert::create(
        age_days <= BACKUP_TEST_INTERVAL_DAYS,
        format!(
            "last backup restore test was {age_days} days ago, expected at most {BACKUP_TEST_INTERVAL_DAYS}"
        ),
    );
    out.push(assert::with_path(outcome, BACKUP_TEST_FIELD));

    Ok(())
}
