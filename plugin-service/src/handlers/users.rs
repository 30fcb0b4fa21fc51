use crate::dtos::{
    self, CompanyStatsResponse, CompanyView, MachinesResponse, UserInfoResponse,
    UserPluginsResponse, UserView,
};
use crate::middleware::AuthenticatedUser;
use crate::services::stats;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

/// Authenticated identity view with the catalog descriptors of every
/// allowed plugin.
pub async fn user_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let ctx = user.0;

    let allowed = state.permissions.allowed_plugin_names(&ctx.identity).await;
    let plugins_details: Vec<_> = state
        .catalog
        .list_artifacts()
        .await
        .into_iter()
        .filter(|artifact| allowed.binary_search(&artifact.name).is_ok())
        .collect();

    Ok(Json(UserInfoResponse {
        success: true,
        user: UserView::from(&ctx.identity),
        company: ctx.company.as_ref().map(CompanyView::from),
        total_plugins: plugins_details.len(),
        plugins_details,
        timestamp: dtos::timestamp(),
    }))
}

/// Detailed permission breakdown: individual grants, per-pack resolution,
/// and the combined effective list.
pub async fn user_plugins(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let ctx = user.0;
    let permissions = state.permissions.detailed_permissions(&ctx.identity).await;

    Ok(Json(UserPluginsResponse {
        success: true,
        user_name: ctx.identity.name.clone(),
        allowed_packs: ctx.identity.allowed_packs.clone(),
        total_plugins: permissions.all_allowed_plugins.len(),
        permissions,
        timestamp: dtos::timestamp(),
    }))
}

/// Statistics for the authenticated identity's owning company. Flat
/// accounts have no owning company and get a 404.
pub async fn company_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let company_id = user
        .0
        .company_id
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("identity has no owning company")))?;

    let snapshot = state.directory.snapshot().await;
    let company_stats = stats::company_stats(&snapshot, &company_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("company not found: {}", company_id)))?;

    Ok(Json(CompanyStatsResponse {
        success: true,
        company_id,
        company_stats,
        timestamp: dtos::timestamp(),
    }))
}

/// Machine registry recorded for a flat account.
pub async fn machines(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.directory.snapshot().await;
    let identity = snapshot
        .users
        .get(&email)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("account not found: {}", email)))?;

    Ok(Json(MachinesResponse {
        success: true,
        email,
        total_machines: identity.machines.len(),
        machines: identity.machines.clone(),
        timestamp: dtos::timestamp(),
    }))
}
