use crate::services::{AuthContext, Credentials};
use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

/// Authenticated caller extractor.
///
/// The secret arrives in `X-Api-Key`. `X-User-Email` selects the flat
/// account scheme; otherwise `X-External-User` + `X-Device-Name` select the
/// company-user scheme. Missing headers are a 401; a failed check from the
/// auth engine maps to 403 via `AppError`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthContext);

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let api_key = header_value(parts, "X-Api-Key")
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("X-Api-Key header required")))?;

        let credentials = if let Some(email) = header_value(parts, "X-User-Email") {
            Credentials::Account { email }
        } else {
            match (
                header_value(parts, "X-External-User"),
                header_value(parts, "X-Device-Name"),
            ) {
                (Some(external_user), Some(device_name)) => Credentials::Device {
                    external_user,
                    device_name,
                },
                _ => {
                    return Err(AppError::Unauthorized(anyhow::anyhow!(
                        "X-User-Email, or X-External-User and X-Device-Name, headers required"
                    )));
                }
            }
        };

        let ctx = state.auth.authenticate(&credentials, &api_key).await?;

        // Add to tracing span for observability
        tracing::Span::current().record("identity", ctx.key.as_str());

        Ok(AuthenticatedUser(ctx))
    }
}
