use crate::models::{ArtifactMeta, PackDetails};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct PluginListResponse {
    pub success: bool,
    pub plugins: Vec<ArtifactMeta>,
    pub plugin_count: usize,
    pub packs: BTreeMap<String, PackDetails>,
    pub pack_count: usize,
    pub timestamp: String,
}
