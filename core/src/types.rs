//! Request payloads and response shapes of the provisioning API.
//!
//! # Design
//! Field names follow the wire format through `serde` renames; the API is
//! not consistent about casing (`DbId` next to `primaryRegion`), so every
//! renamed field is spelled out. Fields marked `#[serde(default)]` decode
//! to an empty value when absent; the rest, such as the wrapped record in
//! `DatabaseResponse`, are required.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Databases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    #[serde(rename = "DbId", default)]
    pub id: String,
    #[serde(rename = "Hostname", default)]
    pub hostname: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(rename = "primaryRegion", default)]
    pub primary_region: String,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseList {
    #[serde(default)]
    pub databases: Vec<Database>,
}

/// Wrapper around a single database record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseResponse {
    pub database: Database,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedDatabase {
    pub database: String,
}

/// Payload for creating a database. Optional fields are omitted when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDatabase {
    pub name: String,
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<DbSeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub is_schema: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl CreateDatabase {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: DbSeed) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Where a new database takes its initial data from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DbSeed {
    Database {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    Dump {
        url: String,
    },
}

/// Result of uploading a raw database dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpUpload {
    pub dump_url: String,
}

/// Usage counters of a database or one of its instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbUsage {
    #[serde(default)]
    pub rows_read: u64,
    #[serde(default, alias = "rows_writen")]
    pub rows_written: u64,
    #[serde(default)]
    pub storage_bytes: u64,
}

/// A replica of a database in one region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbInstance {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub region: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub usage: DbUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbInstanceList {
    #[serde(default)]
    pub instances: Vec<DbInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbInstanceResponse {
    pub instance: DbInstance,
}

/// Usage of a database over a period, per instance and in total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub instances: Vec<DbInstance>,
    #[serde(default)]
    pub total: DbUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseUsage {
    pub database: UsageReport,
}

/// Reporting window for database usage, as RFC 3339 timestamps. The server
/// picks the current month when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsagePeriod {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl UsagePeriod {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub(crate) fn query(&self) -> String {
        query_string([("from", self.from.as_deref()), ("to", self.to.as_deref())])
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Access level of a database or group token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Authorization {
    FullAccess,
    ReadOnly,
}

impl Authorization {
    pub fn as_str(self) -> &'static str {
        match self {
            Authorization::FullAccess => "full-access",
            Authorization::ReadOnly => "read-only",
        }
    }
}

/// Optional parameters for minting a database or group token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenOptions {
    /// Lifetime such as `2w1d30m`; the server default applies when unset.
    pub expiration: Option<String>,
    pub authorization: Option<Authorization>,
}

impl TokenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    pub fn authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Query string for the token endpoints, empty when nothing is set.
    pub(crate) fn query(&self) -> String {
        query_string([
            ("expiration", self.expiration.as_deref()),
            ("authorization", self.authorization.map(Authorization::as_str)),
        ])
    }
}

/// `?k=v&..` with every value form-encoded; unset values are skipped.
fn query_string<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if let Some(value) = value {
            query.append_pair(key, value);
        }
    }
    let query = query.finish();
    if query.is_empty() {
        query
    } else {
        format!("?{query}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwt {
    pub jwt: String,
}

/// A freshly minted platform API token; the secret is only returned once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: String,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenList {
    #[serde(default)]
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    /// Expiry as a unix timestamp; `-1` for tokens that never expire.
    pub exp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locations: Vec<String>,
    pub name: String,
    #[serde(rename = "primary", default)]
    pub primary_region: String,
    #[serde(default)]
    pub uuid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResponse {
    pub group: Group,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList {
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewGroup<'a> {
    pub name: &'a str,
    pub location: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupTransfer<'a> {
    pub organization: &'a str,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// Closest region to the caller, as seen by the region-discovery service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosestRegion {
    pub server: String,
    pub client: String,
}

/// Location code to human-readable description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locations {
    #[serde(default)]
    pub locations: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    #[serde(default)]
    pub blocked_reads: bool,
    #[serde(default)]
    pub blocked_writes: bool,
    pub name: String,
    #[serde(default)]
    pub overages: bool,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

/// Fields to change on an organization; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgUpdate {
    pub blocked_reads: Option<bool>,
    pub blocked_writes: Option<bool>,
    pub name: Option<String>,
    pub overages: Option<bool>,
    pub slug: Option<String>,
    pub kind: Option<String>,
}

impl OrgUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocked_reads(mut self, blocked: bool) -> Self {
        self.blocked_reads = Some(blocked);
        self
    }

    pub fn blocked_writes(mut self, blocked: bool) -> Self {
        self.blocked_writes = Some(blocked);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn overages(mut self, overages: bool) -> Self {
        self.overages = Some(overages);
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// `org` with this update applied. The token is never sent back.
    pub fn apply(&self, org: &Org) -> Org {
        Org {
            blocked_reads: self.blocked_reads.unwrap_or(org.blocked_reads),
            blocked_writes: self.blocked_writes.unwrap_or(org.blocked_writes),
            name: self.name.clone().unwrap_or_else(|| org.name.clone()),
            overages: self.overages.unwrap_or(org.overages),
            slug: self.slug.clone().unwrap_or_else(|| org.slug.clone()),
            kind: self.kind.clone().unwrap_or_else(|| org.kind.clone()),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub role: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedMember {
    pub member: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invite {
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub deleted_at: String,
    pub email: String,
    #[serde(rename = "ID", default)]
    pub id: i64,
    #[serde(default)]
    pub organization: Org,
    #[serde(rename = "OrganizationID", default)]
    pub organization_id: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteList {
    #[serde(default)]
    pub invites: Vec<Invite>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewMember<'a> {
    pub username: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewInvite<'a> {
    pub email: &'a str,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Audit logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    pub author: String,
    pub code: String,
    pub created_at: String,
    /// Free-form event payload.
    #[serde(default)]
    pub data: serde_json::Value,
    pub message: String,
    pub origin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_rows: u32,
}

/// One page of audit logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogs {
    #[serde(default)]
    pub audit_logs: Vec<AuditLog>,
    pub pagination: Pagination,
}
