pub mod artifact;
pub mod identity;
pub mod pack;

pub use artifact::ArtifactMeta;
pub use identity::{Company, Directory, Identity, MachineRecord, SightingMeta};
pub use pack::{Pack, PackDetails, PackFile, PluginListing};

/// Sentinel meaning "all" in individual grants, pack grants, and pack member lists.
pub const WILDCARD: &str = "*";
