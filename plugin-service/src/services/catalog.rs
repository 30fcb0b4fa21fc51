use crate::models::ArtifactMeta;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Read-only view over the plugins directory. Every call re-scans the
/// directory so listings are always fresh; the expected catalog size is
/// tens to low hundreds of entries.
#[derive(Debug, Clone)]
pub struct ArtifactCatalog {
    plugins_dir: PathBuf,
    extension: String,
}

impl ArtifactCatalog {
    pub fn new(plugins_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            extension: extension.into(),
        }
    }

    /// List all artifacts, sorted by name. An absent directory yields an
    /// empty list, never an error.
    pub async fn list_artifacts(&self) -> Vec<ArtifactMeta> {
        let mut artifacts = Vec::new();

        let mut entries = match fs::read_dir(&self.plugins_dir).await {
            Ok(entries) => entries,
            Err(_) => return artifacts,
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            artifacts.push(ArtifactMeta {
                name: name.to_string(),
                size: metadata.len(),
                modified,
            });
        }

        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        artifacts
    }

    /// Artifact names only, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.list_artifacts()
            .await
            .into_iter()
            .map(|a| a.name)
            .collect()
    }

    pub async fn exists(&self, name: &str) -> bool {
        match self.artifact_path(name) {
            Some(path) => fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// On-disk path for an artifact name. Names that could escape the
    /// plugins directory are rejected.
    pub fn artifact_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || Path::new(name).is_absolute()
        {
            return None;
        }
        Some(
            self.plugins_dir
                .join(format!("{}.{}", name, self.extension)),
        )
    }
}
