use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::identity::AccountRecord;

/// JWT claims embedded in a session token.
///
/// Role flags are snapshotted at token issue time; a claims change on the
/// account record becomes visible only after the caller re-authenticates
/// (login or refresh) and receives a fresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier (opaque, stable).
    pub sub: String,
    pub email: String,
    pub admin: bool,
    pub gcp_access: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_account(account: &AccountRecord) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: account.uid.clone(),
            email: account.email.clone(),
            admin: account.admin,
            gcp_access: account.gcp_access,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Caller identity passed explicitly into every privileged operation.
///
/// A read-only projection of the token claims; never consulted as a source
/// of truth for the account record itself.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub account_id: String,
    pub email: String,
    pub admin: bool,
    pub gcp_access: bool,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            email: claims.email,
            admin: claims.admin,
            gcp_access: claims.gcp_access,
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "invalid JWT: {}", msg),
            JwtError::InvalidSecret => write!(f, "invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(admin: bool, gcp_access: bool) -> AccountRecord {
        AccountRecord {
            uid: "acct-1".to_string(),
            email: "user@example.com".to_string(),
            display_name: None,
            disabled: false,
            admin,
            gcp_access,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn round_trips_claims_through_token() {
        let claims = Claims::for_account(&account(true, false));
        let token = generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, "acct-1");
        assert!(decoded.admin);
        assert!(!decoded.gcp_access);
    }

    #[test]
    fn rejects_tampered_token() {
        let claims = Claims::for_account(&account(false, true));
        let mut token = generate_jwt(&claims).unwrap();
        token.push('x');
        assert!(validate_jwt(&token).is_err());
    }

    #[test]
    fn auth_context_projects_claims() {
        let ctx = AuthContext::from(Claims::for_account(&account(false, true)));
        assert_eq!(ctx.account_id, "acct-1");
        assert!(ctx.gcp_access);
        assert!(!ctx.admin);
    }
}
