use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::handlers::public::auth::session_response;
use crate::state::AppState;

/// GET /api/auth/whoami - Echo the caller context decoded from the token
pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "uid": ctx.account_id,
            "email": ctx.email,
            "admin": ctx.admin,
            "gcpAccess": ctx.gcp_access,
        }
    }))
}

/// POST /api/auth/refresh - Re-issue the session token
///
/// Claims changes (tier grants, admin elevation) only become visible to the
/// gate once the caller holds a token minted after the change; this is how
/// they pick one up without re-entering credentials.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let account = state
        .identity
        .find_by_uid(&ctx.account_id)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("account no longer exists"))?;
    if account.disabled {
        return Err(ApiError::permission_denied("account is disabled"));
    }
    Ok(Json(session_response(&account)?))
}
