use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::object_key;

/// GET /files/:uid/:name - Serve a hot-tier object's bytes
///
/// This is the surface behind every `url` field handed out by listings, and
/// the reference the archive engine's source fetch dereferences.
pub async fn download(
    State(state): State<AppState>,
    Path((uid, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let body = state.hot.get(&object_key(&uid, &name)).await?;
    Ok(([(header::CONTENT_TYPE, body.content_type)], body.bytes).into_response())
}
