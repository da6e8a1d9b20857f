//! Explain registry for rules.
//!
//! Maps rule IDs to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a rule.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the rule.
    pub title: &'static str,
    /// What the rule checks and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after target object examples (JSON fields).
    pub examples: ExamplePair,
}

/// Before and after target object examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Fields that would fail the rule.
    pub before: &'static str,
    /// Fields that pass the rule.
    pub after: &'static str,
}

/// Look up an explanation by rule_id.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        ids::RULE_SHAREPOINT_RECYCLE_BIN_RETENTION => Some(explain_recycle_bin_retention()),
        ids::RULE_SHAREPOINT_VERSIONING_ENABLED => Some(explain_versioning_enabled()),
        ids::RULE_SHAREPOINT_EXTERNAL_SHARING => Some(explain_external_sharing()),
        ids::RULE_EXCHANGE_MAILBOX_AUDIT => Some(explain_mailbox_audit()),
        ids::RULE_EXCHANGE_AUTO_FORWARDING => Some(explain_auto_forwarding()),
        ids::RULE_DNS_DMARC_ENFORCED => Some(explain_dmarc_enforced()),
        ids::RULE_TENANT_ADMIN_CONTACTS => Some(explain_admin_contacts()),
        _ => None,
    }
}

/// List all known rule IDs.
pub fn all_rule_ids() -> &'static [&'static str] {
    &[
        ids::RULE_SHAREPOINT_RECYCLE_BIN_RETENTION,
        ids::RULE_SHAREPOINT_VERSIONING_ENABLED,
        ids::RULE_SHAREPOINT_EXTERNAL_SHARING,
        ids::RULE_EXCHANGE_MAILBOX_AUDIT,
        ids::RULE_EXCHANGE_AUTO_FORWARDING,
        ids::RULE_DNS_DMARC_ENFORCED,
        ids::RULE_TENANT_ADMIN_CONTACTS,
    ]
}

fn explain_recycle_bin_retention() -> Explanation {
    Explanation {
        title: "Adequate Recycle Bin Retention",
        description: "\
Checks that deleted content stays recoverable long enough and that restores are exercised.

The recycle bin is the first line of recovery for accidental or malicious deletion:
- A retention period shorter than 30 days leaves too little time to notice a loss
- A backup restore test older than one quarter means recovery is unproven

Applies to tenant objects and to any object that reports `RecycleBinRetentionPeriod`.",
        remediation: "\
Raise `RecycleBinRetentionPeriod` to at least 30 days.

Run a restore test at least once per quarter and record the date in
`LastBackupTest`.",
        examples: ExamplePair {
            before: r#"{ "RecycleBinRetentionPeriod": 15, "LastBackupTest": "2025-01-02T00:00:00Z" }"#,
            after: r#"{ "RecycleBinRetentionPeriod": 93, "LastBackupTest": "2026-09-30T00:00:00Z" }"#,
        },
    }
}

fn explain_versioning_enabled() -> Explanation {
    Explanation {
        title: "Document Versioning Enabled",
        description: "\
Checks that document libraries keep prior versions of files.

Without versioning an overwrite or a ransomware encryption pass destroys the only copy.
When a major version limit is reported it must keep at least 100 versions.

Applies only to objects that report `EnableVersioning`.",
        remediation: "\
Set `EnableVersioning` to true on the library and keep `MajorVersionLimit` at 100 or more.",
        examples: ExamplePair {
            before: r#"{ "Url": "https://contoso/sites/hr", "EnableVersioning": false }"#,
            after: r#"{ "Url": "https://contoso/sites/hr", "EnableVersioning": true, "MajorVersionLimit": 500 }"#,
        },
    }
}

fn explain_external_sharing() -> Explanation {
    Explanation {
        title: "Restricted External Sharing",
        description: "\
Checks that sites do not allow anonymous sharing links.

`SharingCapability` must be one of `Disabled`, `ExistingExternalUserSharingOnly` or
`ExternalUserSharingOnly`. When anonymous links are configured they must expire within 30 days.",
        remediation: "\
Lower `SharingCapability` to `ExternalUserSharingOnly` or stricter and set
`RequireAnonymousLinksExpireInDays` to 30 or less.",
        examples: ExamplePair {
            before: r#"{ "SharingCapability": "ExternalUserAndGuestSharing" }"#,
            after: r#"{ "SharingCapability": "ExistingExternalUserSharingOnly" }"#,
        },
    }
}

fn explain_mailbox_audit() -> Explanation {
    Explanation {
        title: "Mailbox Auditing",
        description: "\
Checks that mailbox auditing is on and audit records are kept for at least 90 days.

Mailbox audit records are required to investigate account compromise.

Applies to objects of kind `Exchange.Mailbox`.",
        remediation: "\
Enable auditing on the mailbox and set `AuditLogAgeLimit` to 90 days or more.",
        examples: ExamplePair {
            before: r#"{ "AuditEnabled": false, "AuditLogAgeLimit": 30 }"#,
            after: r#"{ "AuditEnabled": true, "AuditLogAgeLimit": 180 }"#,
        },
    }
}

fn explain_auto_forwarding() -> Explanation {
    Explanation {
        title: "Automatic External Forwarding Disabled",
        description: "\
Checks that remote domains do not accept automatically forwarded mail.

Automatic forwarding to external domains is a common exfiltration channel after a
mailbox compromise.

Applies to objects of kind `Exchange.RemoteDomain`.",
        remediation: "\
Set `AutoForwardEnabled` to false on every remote domain, including the default `*` domain.",
        examples: ExamplePair {
            before: r#"{ "DomainName": "*", "AutoForwardEnabled": true }"#,
            after: r#"{ "DomainName": "*", "AutoForwardEnabled": false }"#,
        },
    }
}

fn explain_dmarc_enforced() -> Explanation {
    Explanation {
        title: "DMARC Policy Enforced",
        description: "\
Checks that the published DMARC record is well formed and enforcing.

A record must start with `v=DMARC1`. A `p=none` policy only monitors and does not
stop spoofed mail from being delivered.

Applies only to objects that report `DmarcRecord`.",
        remediation: "\
Publish a DMARC record with `p=quarantine` or `p=reject`.",
        examples: ExamplePair {
            before: r#"{ "DmarcRecord": "v=DMARC1; p=none; rua=mailto:d@contoso.com" }"#,
            after: r#"{ "DmarcRecord": "v=DMARC1; p=reject; rua=mailto:d@contoso.com" }"#,
        },
    }
}

fn explain_admin_contacts() -> Explanation {
    Explanation {
        title: "Technical Notification Contacts",
        description: "\
Checks that the tenant lists at least one technical notification address.

Service and security notices are sent to these addresses.",
        remediation: "\
Add one or more monitored addresses to `TechnicalNotificationMails`.",
        examples: ExamplePair {
            before: r#"{ "TechnicalNotificationMails": [] }"#,
            after: r#"{ "TechnicalNotificationMails": ["secops@contoso.com"] }"#,
        },
    }
}
