//! Authorization gate.
//!
//! Every protected and elevated route passes through `jwt_auth_middleware`,
//! which validates the bearer token and injects an `AuthContext` extension.
//! The claim gates below are pure checks over that context; they have no
//! side effects and no shared state.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{validate_jwt, AuthContext};
use crate::error::ApiError;

/// JWT authentication middleware that validates tokens and extracts the
/// caller context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&headers)
        .map_err(|msg| ApiError::unauthenticated(msg).into_response())?;

    let claims = validate_jwt(&token)
        .map_err(|e| ApiError::unauthenticated(e.to_string()).into_response())?;

    let ctx = AuthContext::from(claims);
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Gate for privileged operations: the decoded claims must carry `admin`.
pub fn require_admin(ctx: &AuthContext) -> Result<(), ApiError> {
    if !ctx.admin {
        return Err(ApiError::permission_denied("administrator claim required"));
    }
    Ok(())
}

/// Gate for tier operations: the decoded claims must carry `gcp_access`.
/// The self-grant operation is exempt by simply not calling this.
pub fn require_tier_access(ctx: &AuthContext) -> Result<(), ApiError> {
    if !ctx.gcp_access {
        return Err(ApiError::permission_denied(
            "cold storage access has not been granted for this account",
        ));
    }
    Ok(())
}
