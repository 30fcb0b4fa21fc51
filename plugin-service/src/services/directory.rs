use crate::models::{Directory, Identity, MachineRecord, SightingMeta};
use crate::services::error::EngineError;
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

pub const USERS_FILE: &str = "users.json";

/// Holds the identity directory loaded from users.json.
///
/// Readers clone an immutable snapshot under the read lock. The only write
/// path is `record_machine_sighting`, which holds the write lock across the
/// whole mutate-and-persist critical section so concurrent sightings cannot
/// lose updates.
#[derive(Debug)]
pub struct DirectoryStore {
    path: PathBuf,
    snapshot: RwLock<Directory>,
}

impl DirectoryStore {
    /// Load the directory from the config directory. A missing file is
    /// `ConfigMissing` (the caller decides whether that is fatal); malformed
    /// JSON and duplicate identity keys are `ConfigCorrupt`.
    pub async fn load(config_dir: &Path) -> Result<Self, EngineError> {
        let path = config_dir.join(USERS_FILE);
        let directory = read_directory(&path).await?;
        tracing::info!(
            companies = directory.companies.len(),
            accounts = directory.users.len(),
            "Identity directory loaded"
        );
        Ok(Self {
            path,
            snapshot: RwLock::new(directory),
        })
    }

    /// An empty directory bound to the config directory; used when the
    /// backing file does not exist yet.
    pub fn empty(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(USERS_FILE),
            snapshot: RwLock::new(Directory::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory snapshot from disk.
    pub async fn reload(&self) -> Result<(), EngineError> {
        let directory = read_directory(&self.path).await?;
        *self.snapshot.write().await = directory;
        Ok(())
    }

    /// Immutable snapshot handle for readers.
    pub async fn snapshot(&self) -> Directory {
        self.snapshot.read().await.clone()
    }

    /// Look up an identity by key: flat accounts first, then every
    /// company's user map. Activation gating is the auth engine's concern,
    /// not the store's.
    pub async fn find(&self, key: &str) -> Option<Identity> {
        let snapshot = self.snapshot.read().await;
        if let Some(identity) = snapshot.users.get(key) {
            return Some(identity.clone());
        }
        snapshot
            .companies
            .values()
            .find_map(|company| company.users.get(key).cloned())
    }

    /// Record that `machine_id` was seen for the identity at `key` and
    /// persist the whole directory synchronously.
    ///
    /// The in-memory mutation is not rolled back when the write fails; the
    /// caller gets `PersistFailed` and the snapshot keeps the sighting.
    pub async fn record_machine_sighting(
        &self,
        key: &str,
        machine_id: &str,
        meta: SightingMeta,
    ) -> Result<(), EngineError> {
        let mut snapshot = self.snapshot.write().await;

        let identity = if snapshot.users.contains_key(key) {
            snapshot.users.get_mut(key)
        } else {
            snapshot
                .companies
                .values_mut()
                .find_map(|company| company.users.get_mut(key))
        };
        let identity = identity.ok_or(EngineError::IdentityNotFound)?;

        let now = Utc::now();
        let record = identity
            .machines
            .entry(machine_id.to_string())
            .or_insert_with(|| MachineRecord {
                first_seen: now,
                last_seen: now,
                downloads: 0,
                os_version: None,
                client_version: None,
            });
        record.last_seen = now;
        record.downloads += 1;
        if meta.os_version.is_some() {
            record.os_version = meta.os_version;
        }
        if meta.client_version.is_some() {
            record.client_version = meta.client_version;
        }

        let raw = serde_json::to_string_pretty(&*snapshot)
            .map_err(|e| EngineError::PersistFailed(e.to_string()))?;
        fs::write(&self.path, raw).await.map_err(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Directory write failed; in-memory sighting retained"
            );
            EngineError::PersistFailed(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(identity = key, machine = machine_id, "Machine sighting recorded");
        Ok(())
    }
}

async fn read_directory(path: &Path) -> Result<Directory, EngineError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EngineError::ConfigMissing(path.display().to_string()));
        }
        Err(e) => {
            return Err(EngineError::ConfigCorrupt(format!(
                "{}: {}",
                path.display(),
                e
            )));
        }
    };
    let directory: Directory = serde_json::from_str(&raw)
        .map_err(|e| EngineError::ConfigCorrupt(format!("{}: {}", path.display(), e)))?;
    validate_unique_keys(&directory)?;
    Ok(directory)
}

/// An identity key duplicated across companies (or between the flat and
/// grouped scopes) would make authentication order-dependent; reject it at
/// load instead of silently shadowing.
fn validate_unique_keys(directory: &Directory) -> Result<(), EngineError> {
    let mut seen: HashSet<&str> = directory.users.keys().map(String::as_str).collect();
    for (company_id, company) in &directory.companies {
        for key in company.users.keys() {
            if !seen.insert(key) {
                return Err(EngineError::ConfigCorrupt(format!(
                    "duplicate identity key '{}' (company '{}')",
                    key, company_id
                )));
            }
        }
    }
    Ok(())
}
