pub mod auth;
pub mod catalog;
pub mod directory;
pub mod error;
pub mod packs;
pub mod permissions;
pub mod stats;

pub use auth::{AuthContext, AuthEngine, Credentials};
pub use catalog::ArtifactCatalog;
pub use directory::DirectoryStore;
pub use error::EngineError;
pub use packs::PackResolver;
pub use permissions::{DetailedPermissions, PermissionEvaluator};
