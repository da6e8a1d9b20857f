//! Stable identifiers for rules, categories and metadata keys.
//!
//! `rule_id` is a dotted namespace: `<platform>.<snake_case_name>`.

// Rules
pub const RULE_SHAREPOINT_RECYCLE_BIN_RETENTION: &str = "sharepoint.recycle_bin_retention";
pub const RULE_SHAREPOINT_VERSIONING_ENABLED: &str = "sharepoint.versioning_enabled";
pub const RULE_SHAREPOINT_EXTERNAL_SHARING: &str = "sharepoint.external_sharing";
pub const RULE_EXCHANGE_MAILBOX_AUDIT: &str = "exchange.mailbox_audit";
pub const RULE_EXCHANGE_AUTO_FORWARDING: &str = "exchange.auto_forwarding";
pub const RULE_DNS_DMARC_ENFORCED: &str = "dns.dmarc_enforced";
pub const RULE_TENANT_ADMIN_CONTACTS: &str = "tenant.admin_contacts";

// Categories
pub const CATEGORY_REGULAR_BACKUPS: &str = "Regular Backups";
pub const CATEGORY_EXTERNAL_SHARING: &str = "External Sharing";
pub const CATEGORY_AUDIT_LOGGING: &str = "Audit Logging";
pub const CATEGORY_DATA_LOSS_PREVENTION: &str = "Data Loss Prevention";
pub const CATEGORY_EMAIL_AUTHENTICATION: &str = "Email Authentication";
pub const CATEGORY_GOVERNANCE: &str = "Governance";

// Object kinds
pub const KIND_SHAREPOINT_TENANT: &str = "SharePoint.Tenant";
pub const KIND_SHAREPOINT_SITE: &str = "SharePoint.Site";
pub const KIND_EXCHANGE_MAILBOX: &str = "Exchange.Mailbox";
pub const KIND_EXCHANGE_REMOTE_DOMAIN: &str = "Exchange.RemoteDomain";
pub const KIND_TENANT_ORGANIZATION: &str = "Tenant.Organization";
pub const KIND_DNS_DOMAIN: &str = "Dns.Domain";

// Metadata keys every rule declaration must carry
pub const META_SEVERITY: &str = "severity";
pub const META_CATEGORY: &str = "category";

// Tool-level
pub const RULE_TOOL_RUNTIME: &str = "tool.runtime";
pub const CATEGORY_TOOL: &str = "Tool";
