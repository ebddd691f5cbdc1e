use axum::{extract::State, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::middleware::require_tier_access;
use crate::state::AppState;
use crate::storage::object_key;

/// GET /api/archive/files - List the caller's cold-tier files
///
/// Always answered from the bucket itself, by prefix. The metadata index is
/// advisory and never backs a listing, so index drift cannot corrupt what
/// the caller sees here.
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    require_tier_access(&ctx)?;
    let objects = state.cold.list(&ctx.account_id).await?;
    let files: Vec<Value> = objects
        .iter()
        .map(|o| {
            json!({
                "name": o.name,
                "url": state.engine.cold_url(&object_key(&ctx.account_id, &o.name)),
                "sizeBytes": o.size_bytes,
                "contentType": o.content_type,
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "data": { "files": files } })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub file_name: String,
    pub file_url: String,
}

/// POST /api/archive/upload - Move a hot-tier file into the cold bucket
pub async fn upload(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<ArchiveRequest>,
) -> Result<Json<Value>, ApiError> {
    require_tier_access(&ctx)?;
    if payload.file_name.trim().is_empty() || payload.file_url.trim().is_empty() {
        return Err(ApiError::invalid_argument("fileName and fileUrl are required"));
    }

    let message = state.engine.archive(&ctx, &payload.file_name, &payload.file_url).await?;
    Ok(Json(json!({ "success": true, "message": message })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
    pub file_name: String,
}

/// POST /api/archive/download - Move one cold-tier file back to the hot tier
pub async fn download(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<RetrieveRequest>,
) -> Result<Json<Value>, ApiError> {
    require_tier_access(&ctx)?;
    if payload.file_name.trim().is_empty() {
        return Err(ApiError::invalid_argument("fileName is required"));
    }

    state.engine.retrieve_one(&ctx, &payload.file_name).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} retrieved from cold storage", payload.file_name)
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRetrieveRequest {
    pub file_names: Vec<String>,
}

/// POST /api/archive/download/batch - Retrieve a set of files
///
/// Per-item failures are reported as data, never as a call-level error: the
/// caller reacts per file and re-lists the archive to reconcile its view.
pub async fn download_batch(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<BatchRetrieveRequest>,
) -> Result<Json<Value>, ApiError> {
    require_tier_access(&ctx)?;
    if payload.file_names.is_empty() {
        return Err(ApiError::invalid_argument("fileNames must not be empty"));
    }

    let report = state.engine.retrieve(&ctx, &payload.file_names).await;
    Ok(Json(json!({
        "success": report.failed.is_empty(),
        "message": report.message(),
        "data": {
            "succeeded": report.succeeded,
            "failed": report.failed,
        }
    })))
}
