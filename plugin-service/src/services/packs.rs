use crate::models::{Pack, PackDetails, PackFile, PluginListing, WILDCARD};
use crate::services::catalog::ArtifactCatalog;
use crate::services::error::EngineError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

pub const PACKS_FILE: &str = "plugin_packs.json";

/// Resolves pack names to artifact lists. Pack definitions are loaded
/// wholesale from plugin_packs.json; wildcard members expand against the
/// artifact catalog at resolution time.
///
/// Resolution never errors: unknown packs contribute nothing and include
/// lists are expanded a single level, so cycles terminate trivially.
#[derive(Debug, Clone)]
pub struct PackResolver {
    config_path: PathBuf,
    packs: PackFile,
    catalog: Arc<ArtifactCatalog>,
}

impl PackResolver {
    /// Load pack definitions from the config directory. A missing file is
    /// seeded with the default configuration and written back; unreadable
    /// JSON is a corrupt-configuration error.
    pub async fn load(
        config_dir: &Path,
        catalog: Arc<ArtifactCatalog>,
    ) -> Result<Self, EngineError> {
        let config_path = config_dir.join(PACKS_FILE);

        let packs = match fs::read_to_string(&config_path).await {
            Ok(raw) => serde_json::from_str::<PackFile>(&raw).map_err(|e| {
                EngineError::ConfigCorrupt(format!("{}: {}", config_path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = default_pack_file();
                tracing::info!(path = %config_path.display(), "Pack config missing, seeding defaults");
                write_pack_file(&config_path, &defaults).await?;
                defaults
            }
            Err(e) => {
                return Err(EngineError::ConfigCorrupt(format!(
                    "{}: {}",
                    config_path.display(),
                    e
                )));
            }
        };

        Ok(Self {
            config_path,
            packs,
            catalog,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn known_pack(&self, name: &str) -> bool {
        self.packs.packs.contains_key(name)
    }

    /// Resolve a pack to its artifact names: direct members, plus the
    /// direct members of each included pack (single-level expansion only),
    /// deduplicated and sorted. A wildcard anywhere in the accumulated list
    /// replaces it with the full current catalog. Unknown packs resolve to
    /// an empty list.
    pub async fn resolve_pack(&self, name: &str) -> Vec<String> {
        let Some(pack) = self.packs.packs.get(name) else {
            return Vec::new();
        };

        let mut members: Vec<String> = pack.plugins.clone();
        for included in &pack.includes_packs {
            if let Some(included_pack) = self.packs.packs.get(included) {
                members.extend(included_pack.plugins.iter().cloned());
            }
        }

        if members.iter().any(|m| m == WILDCARD) {
            return self.catalog.names().await;
        }

        members.sort();
        members.dedup();
        members
    }

    /// Resolve several packs at once, each independently.
    pub async fn resolve_packs(&self, names: &[String]) -> BTreeMap<String, Vec<String>> {
        let mut resolved = BTreeMap::new();
        for name in names {
            resolved.insert(name.clone(), self.resolve_pack(name).await);
        }
        resolved
    }

    /// Detail view of a single pack with its member list fully expanded.
    pub async fn pack_info(&self, name: &str) -> Option<PackDetails> {
        let pack = self.packs.packs.get(name)?;
        let plugins = self.resolve_pack(name).await;
        Some(PackDetails {
            name: pack.name.clone(),
            description: pack.description.clone(),
            plugin_count: plugins.len(),
            plugins,
            price: pack.price,
            category: pack.category.clone(),
        })
    }

    /// Detail views for every configured pack.
    pub async fn list_packs(&self) -> BTreeMap<String, PackDetails> {
        let mut details = BTreeMap::new();
        for name in self.packs.packs.keys() {
            if let Some(info) = self.pack_info(name).await {
                details.insert(name.clone(), info);
            }
        }
        details
    }
}

async fn write_pack_file(path: &Path, packs: &PackFile) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| EngineError::PersistFailed(format!("{}: {}", path.display(), e)))?;
    }
    let raw = serde_json::to_string_pretty(packs)
        .map_err(|e| EngineError::PersistFailed(e.to_string()))?;
    fs::write(path, raw)
        .await
        .map_err(|e| EngineError::PersistFailed(format!("{}: {}", path.display(), e)))
}

fn default_pack_file() -> PackFile {
    let mut packs = BTreeMap::new();
    packs.insert(
        "basic".to_string(),
        Pack {
            name: "Basic Pack".to_string(),
            description: "Essential tools to get started".to_string(),
            plugins: vec!["hello_world".to_string()],
            price: 29.99,
            category: "starter".to_string(),
            includes_packs: Vec::new(),
        },
    );
    packs.insert(
        "premium".to_string(),
        Pack {
            name: "Premium Pack".to_string(),
            description: "Access to every available plugin".to_string(),
            plugins: vec![WILDCARD.to_string()],
            price: 199.99,
            category: "professional".to_string(),
            includes_packs: Vec::new(),
        },
    );

    let mut individual_plugins = BTreeMap::new();
    individual_plugins.insert(
        "hello_world".to_string(),
        PluginListing {
            name: "Hello World".to_string(),
            description: "Demo and smoke-test plugin".to_string(),
            price: 0.0,
            category: "demo".to_string(),
        },
    );

    PackFile {
        packs,
        individual_plugins,
    }
}
