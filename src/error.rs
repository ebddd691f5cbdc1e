// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
///
/// Every handler catches internal faults and maps them onto this taxonomy;
/// raw backend errors never cross the call boundary.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - missing or malformed required field
    InvalidArgument(String),

    // 401 Unauthorized - no token, or token invalid/expired
    Unauthenticated(String),

    // 403 Forbidden - authenticated but lacking the required claim or ownership
    PermissionDenied(String),

    // 404 Not Found - source object absent
    NotFound(String),

    // 502 Bad Gateway - source fetch failed (unreachable or non-success status)
    UpstreamFetch(String),

    // 500 Internal Server Error - unexpected storage/backend failure
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidArgument(_) => 400,
            ApiError::Unauthenticated(_) => 401,
            ApiError::PermissionDenied(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::UpstreamFetch(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidArgument(msg) => msg,
            ApiError::Unauthenticated(msg) => msg,
            ApiError::PermissionDenied(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::UpstreamFetch(msg) => msg,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UpstreamFetch(_) => "UPSTREAM_FETCH_ERROR",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn upstream_fetch(message: impl Into<String>) -> Self {
        ApiError::UpstreamFetch(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::storage::StoreError> for ApiError {
    fn from(err: crate::storage::StoreError) -> Self {
        match err {
            crate::storage::StoreError::NotFound(key) => {
                ApiError::not_found(format!("object not found: {}", key))
            }
            crate::storage::StoreError::InvalidKey(msg) => ApiError::invalid_argument(msg),
            crate::storage::StoreError::Io(e) => {
                // Log the real error but return a generic message
                tracing::error!("storage I/O error: {}", e);
                ApiError::internal("storage backend error")
            }
            crate::storage::StoreError::Backend(msg) => {
                tracing::error!("storage backend error: {}", msg);
                ApiError::internal("storage backend error")
            }
        }
    }
}

impl From<crate::index::IndexError> for ApiError {
    fn from(err: crate::index::IndexError) -> Self {
        match err {
            crate::index::IndexError::Database(e) => {
                tracing::error!("metadata index database error: {}", e);
                ApiError::internal("metadata index error")
            }
            crate::index::IndexError::Backend(msg) => {
                tracing::error!("metadata index error: {}", msg);
                ApiError::internal("metadata index error")
            }
        }
    }
}

impl From<crate::identity::IdentityError> for ApiError {
    fn from(err: crate::identity::IdentityError) -> Self {
        match err {
            crate::identity::IdentityError::NotFound(what) => {
                ApiError::not_found(format!("account not found: {}", what))
            }
            crate::identity::IdentityError::EmailTaken(email) => {
                ApiError::invalid_argument(format!("email already registered: {}", email))
            }
            crate::identity::IdentityError::InvalidPageToken(_) => {
                ApiError::invalid_argument("invalid page token")
            }
            crate::identity::IdentityError::Database(e) => {
                tracing::error!("identity store database error: {}", e);
                ApiError::internal("identity store error")
            }
            crate::identity::IdentityError::Backend(msg) => {
                tracing::error!("identity store error: {}", msg);
                ApiError::internal("identity store error")
            }
        }
    }
}

impl From<crate::services::migration::MigrationError> for ApiError {
    fn from(err: crate::services::migration::MigrationError) -> Self {
        use crate::services::migration::MigrationError;
        match err {
            MigrationError::InvalidFileName(name) => {
                ApiError::invalid_argument(format!("invalid file name: {}", name))
            }
            MigrationError::SourceFetch { url, detail } => {
                tracing::warn!("source fetch failed for {}: {}", url, detail);
                ApiError::upstream_fetch(format!("failed to fetch source object: {}", detail))
            }
            MigrationError::SourceMissing(name) => {
                ApiError::not_found(format!("file not in archive: {}", name))
            }
            MigrationError::Staging(e) => {
                tracing::error!("staging error: {}", e);
                ApiError::internal("failed to stage file for transfer")
            }
            MigrationError::Store(e) => e.into(),
            MigrationError::Index(e) => e.into(),
        }
    }
}

impl From<crate::services::accounts::AccountError> for ApiError {
    fn from(err: crate::services::accounts::AccountError) -> Self {
        use crate::services::accounts::AccountError;
        match err {
            AccountError::PermissionDenied => {
                ApiError::permission_denied("administrator claim required")
            }
            AccountError::MissingTarget => {
                ApiError::invalid_argument("target account id is required")
            }
            AccountError::Identity(e) => e.into(),
        }
    }
}

impl From<crate::services::grants::GrantError> for ApiError {
    fn from(err: crate::services::grants::GrantError) -> Self {
        use crate::services::grants::GrantError;
        match err {
            GrantError::PermissionDenied(msg) => ApiError::permission_denied(msg),
            GrantError::Identity(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
