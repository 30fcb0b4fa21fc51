use service_core::error::AppError;
use thiserror::Error;

/// Errors surfaced by the access-control engine and the directory store.
///
/// Authentication failures are caller-recoverable denials; the
/// configuration and persistence variants indicate the backing store is
/// unusable. Grant resolution never errors: unknown packs and artifacts
/// resolve to empty contributions.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("identity not found")]
    IdentityNotFound,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("account disabled")]
    AccountDisabled,

    #[error("account expired")]
    AccountExpired,

    #[error("configuration file missing: {0}")]
    ConfigMissing(String),

    #[error("configuration corrupt: {0}")]
    ConfigCorrupt(String),

    #[error("persist failed: {0}")]
    PersistFailed(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::IdentityNotFound
            | EngineError::InvalidCredential
            | EngineError::AccountDisabled
            | EngineError::AccountExpired => AppError::Forbidden(anyhow::anyhow!("{}", err)),
            EngineError::ConfigMissing(_)
            | EngineError::ConfigCorrupt(_)
            | EngineError::PersistFailed(_) => {
                tracing::error!(error = %err, "Backing store unavailable");
                AppError::ServiceUnavailable
            }
        }
    }
}
