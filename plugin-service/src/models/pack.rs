use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, reusable collection of plugin grants. Member lists may contain
/// the wildcard marker; `includes_packs` pulls the direct members of other
/// packs (single level only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes_packs: Vec<String>,
}

fn default_category() -> String {
    "general".to_string()
}

/// Catalog-style listing for a single plugin sold outside of packs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginListing {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_category")]
    pub category: String,
}

/// The whole plugin_packs.json document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackFile {
    #[serde(default)]
    pub packs: BTreeMap<String, Pack>,
    #[serde(default)]
    pub individual_plugins: BTreeMap<String, PluginListing>,
}

/// Resolved view of a pack with its member list fully expanded.
#[derive(Debug, Clone, Serialize)]
pub struct PackDetails {
    pub name: String,
    pub description: String,
    pub plugins: Vec<String>,
    pub plugin_count: usize,
    pub price: f64,
    pub category: String,
}
