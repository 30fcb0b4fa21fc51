use crate::dtos::{self, PluginListResponse};
use crate::middleware::AuthenticatedUser;
use crate::models::SightingMeta;
use crate::startup::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

/// Public catalog listing: artifacts on disk plus the configured packs.
pub async fn list_plugins(State(state): State<AppState>) -> impl IntoResponse {
    let plugins = state.catalog.list_artifacts().await;
    let packs = state.packs.list_packs().await;

    Json(PluginListResponse {
        success: true,
        plugin_count: plugins.len(),
        plugins,
        pack_count: packs.len(),
        packs,
        timestamp: dtos::timestamp(),
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Authenticated artifact download. The effective permission set gates
/// access before the catalog existence check; a machine id header records a
/// sighting best-effort before the bytes are handed off.
pub async fn get_plugin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let ctx = user.0;

    let plugin_name = header_value(&headers, "X-Plugin-Name")
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("X-Plugin-Name header required")))?;

    if !state
        .permissions
        .is_plugin_allowed(&ctx.identity, &plugin_name)
        .await
    {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "plugin access denied: {}",
            plugin_name
        )));
    }

    let path = state
        .catalog
        .artifact_path(&plugin_name)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("invalid plugin name")))?;
    if !state.catalog.exists(&plugin_name).await {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "plugin not found: {}",
            plugin_name
        )));
    }

    if let Some(machine_id) = header_value(&headers, "X-Machine-Id") {
        let meta = SightingMeta {
            os_version: header_value(&headers, "X-Os-Version"),
            client_version: header_value(&headers, "X-Client-Version"),
        };
        if let Err(e) = state
            .directory
            .record_machine_sighting(&ctx.key, &machine_id, meta)
            .await
        {
            tracing::warn!(
                identity = %ctx.key,
                machine = %machine_id,
                error = %e,
                "Machine sighting not persisted"
            );
        }
    }

    let data = tokio::fs::read(&path).await?;

    tracing::info!(
        plugin = %plugin_name,
        identity = %ctx.identity.name,
        company = ctx.company.as_ref().map(|c| c.name.as_str()).unwrap_or("-"),
        "Plugin downloaded"
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}.{}\"",
                    plugin_name, state.config.storage.artifact_extension
                ),
            ),
        ],
        data,
    ))
}
