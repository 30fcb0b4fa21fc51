use chrono::{DateTime, Utc};
use serde::Serialize;

/// One downloadable artifact as found on disk. Recomputed on every catalog
/// scan; never cached or mutated.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArtifactMeta {
    /// File name with the artifact extension stripped.
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}
