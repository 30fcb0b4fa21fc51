use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A credentialed principal: either a company user keyed by
/// `{external_user}_{device_name}` or a flat account keyed by email.
///
/// Every field except the display name and the API key is optional in the
/// backing document; absent fields deserialize to empty/false/None.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub api_key: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Calendar date (`YYYY-MM-DD`) after which the account is expired.
    /// Kept as the raw string; parsing happens at authentication time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    /// Individually granted artifact names; may contain the wildcard marker.
    #[serde(default)]
    pub allowed_plugins: Vec<String>,
    /// Granted pack names; may contain the wildcard marker.
    #[serde(default)]
    pub allowed_packs: Vec<String>,
    /// Machine id -> last-seen metadata, maintained by the directory store.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub machines: BTreeMap<String, MachineRecord>,
}

/// Last-seen metadata for one machine an identity downloaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineRecord {
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

/// Sighting metadata presented by the transport layer alongside a machine id.
#[derive(Debug, Clone, Default)]
pub struct SightingMeta {
    pub os_version: Option<String>,
    pub client_version: Option<String>,
}

/// A company partitions the grouped identity namespace. An inactive company
/// gates all of its users regardless of their own active flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub users: BTreeMap<String, Identity>,
}

/// The whole users.json document: company-partitioned identities plus flat
/// email-keyed accounts. Either map may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub companies: BTreeMap<String, Company>,
    #[serde(default)]
    pub users: BTreeMap<String, Identity>,
}
