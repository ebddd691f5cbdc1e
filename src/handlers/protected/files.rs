use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::{object_key, validate_file_name, DEFAULT_CONTENT_TYPE};

/// GET /api/files - List the caller's hot-tier files
///
/// Direct adapter listing; nothing here consults the metadata index.
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let objects = state.hot.list(&ctx.account_id).await?;
    let base = &config::config().server.public_base_url;
    let files: Vec<Value> = objects
        .iter()
        .map(|o| {
            json!({
                "name": o.name,
                "url": format!("{}/files/{}/{}", base, ctx.account_id, o.name),
                "sizeBytes": o.size_bytes,
                "contentType": o.content_type,
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "data": { "files": files } })))
}

/// PUT /api/files/:name - Upload a file into the caller's hot tier
pub async fn upload(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    validate_file_name(&name)
        .map_err(|_| ApiError::invalid_argument(format!("invalid file name: {}", name)))?;
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    state
        .hot
        .put(&object_key(&ctx.account_id, &name), &body, content_type)
        .await?;
    Ok(Json(json!({ "success": true, "message": format!("{} uploaded", name) })))
}

/// DELETE /api/files/:name - Remove a file from the caller's hot tier
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.hot.delete(&object_key(&ctx.account_id, &name)).await?;
    Ok(Json(json!({ "success": true, "message": format!("{} deleted", name) })))
}
