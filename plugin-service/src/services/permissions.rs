use crate::models::{Identity, WILDCARD};
use crate::services::catalog::ArtifactCatalog;
use crate::services::packs::PackResolver;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Per-source breakdown of an identity's grants, for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedPermissions {
    pub individual_plugins: Vec<String>,
    pub pack_plugins: BTreeMap<String, Vec<String>>,
    pub all_allowed_plugins: Vec<String>,
}

/// Combines individual grants and pack grants into one effective permission
/// set. Pure function of its inputs at call time; holds no state across
/// calls and never errors.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    resolver: Arc<PackResolver>,
    catalog: Arc<ArtifactCatalog>,
}

impl PermissionEvaluator {
    pub fn new(resolver: Arc<PackResolver>, catalog: Arc<ArtifactCatalog>) -> Self {
        Self { resolver, catalog }
    }

    /// The effective permission set for an identity. A wildcard in the
    /// individual grants short-circuits to the full catalog; a wildcard in
    /// the pack grants unions the catalog into the individual grants. The
    /// returned set is unordered; callers sort when presenting.
    pub async fn effective_permissions(&self, identity: &Identity) -> HashSet<String> {
        if identity.allowed_plugins.iter().any(|p| p == WILDCARD) {
            return self.catalog.names().await.into_iter().collect();
        }

        let mut allowed: HashSet<String> = identity.allowed_plugins.iter().cloned().collect();

        if identity.allowed_packs.iter().any(|p| p == WILDCARD) {
            allowed.extend(self.catalog.names().await);
            return allowed;
        }

        for pack_name in &identity.allowed_packs {
            allowed.extend(self.resolver.resolve_pack(pack_name).await);
        }
        allowed
    }

    /// Sorted effective permission list, for response payloads.
    pub async fn allowed_plugin_names(&self, identity: &Identity) -> Vec<String> {
        let mut names: Vec<String> = self.effective_permissions(identity).await.into_iter().collect();
        names.sort();
        names
    }

    pub async fn is_plugin_allowed(&self, identity: &Identity, plugin_name: &str) -> bool {
        self.effective_permissions(identity)
            .await
            .contains(plugin_name)
    }

    /// Pack access is explicit only: the wildcard or the exact pack name in
    /// the pack grants. Holding a pack that includes another pack's members
    /// does not grant access to that other pack.
    pub fn is_pack_allowed(&self, identity: &Identity, pack_name: &str) -> bool {
        identity
            .allowed_packs
            .iter()
            .any(|p| p == WILDCARD || p == pack_name)
    }

    /// Grants broken down by source: individual names verbatim, each
    /// granted pack with its resolved members (a wildcard pack grant
    /// collapses to a single wildcard entry carrying the full catalog),
    /// and the combined effective list.
    pub async fn detailed_permissions(&self, identity: &Identity) -> DetailedPermissions {
        let mut pack_plugins = BTreeMap::new();
        for pack_name in &identity.allowed_packs {
            if pack_name == WILDCARD {
                pack_plugins.clear();
                pack_plugins.insert(WILDCARD.to_string(), self.catalog.names().await);
                break;
            }
            pack_plugins.insert(pack_name.clone(), self.resolver.resolve_pack(pack_name).await);
        }

        DetailedPermissions {
            individual_plugins: identity.allowed_plugins.clone(),
            pack_plugins,
            all_allowed_plugins: self.allowed_plugin_names(identity).await,
        }
    }
}
