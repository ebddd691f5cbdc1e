use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::error::ApiError;
use crate::identity::{password, AccountRecord, NewAccount};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate and receive a session token
///
/// An unknown email creates the account on first authentication. Role flags
/// are snapshotted into the token at issue time; a later claims change is
/// picked up by logging in (or refreshing) again.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim().to_string();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::invalid_argument("email and password are required"));
    }

    let account = match state.identity.find_by_email(&email).await? {
        Some(account) => {
            if account.disabled {
                return Err(ApiError::permission_denied("account is disabled"));
            }
            if !password::verify(&payload.password, &account.password_hash) {
                return Err(ApiError::unauthenticated("invalid credentials"));
            }
            account
        }
        None => {
            // First authentication creates the account record
            let account = state
                .identity
                .create(NewAccount {
                    email,
                    display_name: None,
                    password_hash: password::hash(&payload.password),
                })
                .await?;
            tracing::info!("account {} created on first authentication", account.uid);
            account
        }
    };

    Ok(Json(session_response(&account)?))
}

pub(crate) fn session_response(account: &AccountRecord) -> Result<Value, ApiError> {
    let claims = Claims::for_account(account);
    let token = generate_jwt(&claims)
        .map_err(|e| ApiError::internal(format!("failed to issue session token: {}", e)))?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(json!({
        "success": true,
        "data": {
            "token": token,
            "user": {
                "uid": account.uid,
                "email": account.email,
                "displayName": account.display_name,
                "admin": account.admin,
                "gcpAccess": account.gcp_access,
            },
            "expiresIn": expires_in,
        }
    }))
}
