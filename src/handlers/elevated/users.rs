//! Admin account-lifecycle endpoints.
//!
//! Each handler builds one `AdminAction` variant and hands it to the account
//! service's exhaustive dispatcher; the admin-claim gate runs inside the
//! service, before any read or mutation.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::services::accounts::{AdminAction, AdminOutcome};
use crate::state::AppState;

/// GET /api/admin/users - List every account, following pagination until
/// exhausted
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.accounts.dispatch(&ctx, AdminAction::ListUsers).await?;
    match outcome {
        AdminOutcome::Users(users) => Ok(Json(json!({ "success": true, "users": users }))),
        _ => Err(ApiError::internal("unexpected dispatch outcome")),
    }
}

/// POST /api/admin/users/:uid/reset-password - Replace the account's
/// credential
///
/// The generated secret appears in this response once and is never stored in
/// the clear.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(uid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.accounts.dispatch(&ctx, AdminAction::ResetPassword { uid }).await?;
    match outcome {
        AdminOutcome::PasswordReset { uid, new_password } => Ok(Json(json!({
            "success": true,
            "message": format!("credential reset for {}", uid),
            "data": { "password": new_password }
        }))),
        _ => Err(ApiError::internal("unexpected dispatch outcome")),
    }
}

/// POST /api/admin/users/:uid/disable
pub async fn disable(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(uid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.accounts.dispatch(&ctx, AdminAction::Disable { uid }).await?;
    disabled_response(outcome)
}

/// POST /api/admin/users/:uid/enable
pub async fn enable(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(uid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.accounts.dispatch(&ctx, AdminAction::Enable { uid }).await?;
    disabled_response(outcome)
}

/// DELETE /api/admin/users/:uid - Remove the identity record
///
/// Terminal and irreversible. The account's files stay where they are in
/// both tiers; identity deletion does not cascade into storage.
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(uid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.accounts.dispatch(&ctx, AdminAction::Delete { uid }).await?;
    match outcome {
        AdminOutcome::Deleted { uid } => Ok(Json(json!({
            "success": true,
            "message": format!("account {} deleted", uid)
        }))),
        _ => Err(ApiError::internal("unexpected dispatch outcome")),
    }
}

fn disabled_response(outcome: AdminOutcome) -> Result<Json<Value>, ApiError> {
    match outcome {
        AdminOutcome::DisabledSet { uid, disabled } => Ok(Json(json!({
            "success": true,
            "message": format!(
                "account {} {}",
                uid,
                if disabled { "disabled" } else { "enabled" }
            )
        }))),
        _ => Err(ApiError::internal("unexpected dispatch outcome")),
    }
}
