use crate::dtos;
use crate::services::stats;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.directory.snapshot().await;
    let statistics = stats::global_stats(&snapshot, &state.catalog).await;

    Json(json!({
        "service": "plugin-service",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "company_management",
            "plugin_packs",
            "individual_plugins",
            "user_expiration",
            "machine_tracking"
        ],
        "statistics": statistics,
        "endpoints": {
            "get_plugin": "/api/get_plugin",
            "plugins": "/api/plugins",
            "pack_info": "/api/pack/{name}",
            "user_info": "/api/user_info",
            "user_plugins": "/api/user_plugins",
            "company_stats": "/api/company_stats",
            "status": "/api/status"
        },
        "timestamp": dtos::timestamp()
    }))
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.directory.snapshot().await;
    let statistics = stats::global_stats(&snapshot, &state.catalog).await;

    let users_json = tokio::fs::try_exists(state.directory.path())
        .await
        .unwrap_or(false);
    let packs_json = tokio::fs::try_exists(state.packs.config_path())
        .await
        .unwrap_or(false);

    Json(json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
        "statistics": statistics,
        "config_files": {
            "users_json": users_json,
            "packs_json": packs_json
        },
        "timestamp": dtos::timestamp()
    }))
}
