pub mod auth;

pub use auth::{jwt_auth_middleware, require_admin, require_tier_access};
