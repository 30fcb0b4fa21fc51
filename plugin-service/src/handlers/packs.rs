use crate::dtos::{self, PackInfoResponse};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn pack_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let pack_info = state
        .packs
        .pack_info(&name)
        .await
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("pack not found: {}", name)))?;

    Ok(Json(PackInfoResponse {
        success: true,
        pack_name: name,
        pack_info,
        timestamp: dtos::timestamp(),
    }))
}
