use crate::models::{Company, Identity};
use crate::services::directory::DirectoryStore;
use crate::services::error::EngineError;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use subtle::ConstantTimeEq;

const EXPIRES_FORMAT: &str = "%Y-%m-%d";

/// Identifier parts presented by the transport layer. Company users present
/// an external user plus a device name; flat accounts present an email.
#[derive(Debug, Clone)]
pub enum Credentials {
    Device {
        external_user: String,
        device_name: String,
    },
    Account {
        email: String,
    },
}

/// Result of a successful authentication, handed to the permission
/// evaluator and to audit logging.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub company_id: Option<String>,
    pub company: Option<Company>,
    /// The composed lookup key (`{user}_{device}` or the email).
    pub key: String,
}

/// Validates presented credentials against the identity directory.
#[derive(Debug, Clone)]
pub struct AuthEngine {
    store: Arc<DirectoryStore>,
}

impl AuthEngine {
    pub fn new(store: Arc<DirectoryStore>) -> Self {
        Self { store }
    }

    /// Authenticate a caller. Company users are searched across the user
    /// maps of active companies only (an inactive company gates all of its
    /// users); flat accounts are looked up directly.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        secret: &str,
    ) -> Result<AuthContext, EngineError> {
        let snapshot = self.store.snapshot().await;

        match credentials {
            Credentials::Device {
                external_user,
                device_name,
            } => {
                let key = format!("{}_{}", external_user, device_name);
                for (company_id, company) in &snapshot.companies {
                    if !company.active {
                        continue;
                    }
                    if let Some(identity) = company.users.get(&key) {
                        check_identity(identity, secret, &key)?;
                        return Ok(AuthContext {
                            identity: identity.clone(),
                            company_id: Some(company_id.clone()),
                            company: Some(company.clone()),
                            key,
                        });
                    }
                }
                Err(EngineError::IdentityNotFound)
            }
            Credentials::Account { email } => {
                let identity = snapshot
                    .users
                    .get(email)
                    .ok_or(EngineError::IdentityNotFound)?;
                check_identity(identity, secret, email)?;
                Ok(AuthContext {
                    identity: identity.clone(),
                    company_id: None,
                    company: None,
                    key: email.clone(),
                })
            }
        }
    }
}

fn check_identity(identity: &Identity, secret: &str, key: &str) -> Result<(), EngineError> {
    if !bool::from(identity.api_key.as_bytes().ct_eq(secret.as_bytes())) {
        return Err(EngineError::InvalidCredential);
    }

    if !identity.active {
        return Err(EngineError::AccountDisabled);
    }

    if let Some(expires) = &identity.expires {
        match NaiveDate::parse_from_str(expires, EXPIRES_FORMAT) {
            Ok(expire_date) => {
                if Local::now().date_naive() > expire_date {
                    return Err(EngineError::AccountExpired);
                }
            }
            Err(_) => {
                // Malformed dates deny nothing; the account stays usable.
                tracing::warn!(
                    identity = key,
                    expires = %expires,
                    "Unparseable expiration date, treating as non-expired"
                );
            }
        }
    }

    Ok(())
}
