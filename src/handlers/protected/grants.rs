use axum::{extract::State, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/auth/grant-access - Self-grant cold storage access
///
/// Requires only authentication. The new claim lands in the identity record
/// immediately but reaches the gate only via a refreshed token.
pub async fn grant_access(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    state.grants.grant_tier_access(&ctx).await?;
    Ok(Json(json!({
        "success": true,
        "message": "cold storage access granted; refresh your session to pick up the new claim"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClaimsRequest {
    pub email: String,
    pub is_admin: bool,
}

/// POST /api/auth/admin-claims - Set admin/tier claims on an account by email
///
/// Admin-only, except for the configured bootstrap allow-list which may
/// self-elevate while no administrator exists yet.
pub async fn admin_claims(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<AdminClaimsRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::invalid_argument("email is required"));
    }

    state.grants.set_admin_claims(&ctx, email, payload.is_admin).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("admin claim for {} set to {}", email, payload.is_admin)
    })))
}
