//! Access-grant issuer: tier-access self-grants and admin elevation.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::auth::AuthContext;
use crate::identity::{AccountRecord, ClaimsUpdate, IdentityError, IdentityStore};

#[derive(Debug, Error)]
pub enum GrantError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub struct GrantService {
    identity: Arc<dyn IdentityStore>,
    /// Emails permitted to self-provision the first administrator. Checked
    /// only while no admin exists; never a general authorization rule.
    bootstrap_admin_emails: Vec<String>,
}

impl GrantService {
    pub fn new(identity: Arc<dyn IdentityStore>, bootstrap_admin_emails: Vec<String>) -> Self {
        Self { identity, bootstrap_admin_emails }
    }

    /// Grant the caller's own account tier access. Idempotent; requires only
    /// authentication. The caller must re-authenticate to receive a token
    /// carrying the new claim.
    pub async fn grant_tier_access(
        &self,
        ctx: &AuthContext,
    ) -> Result<AccountRecord, GrantError> {
        let record = self
            .identity
            .set_claims(&ctx.account_id, ClaimsUpdate { gcp_access: Some(true), admin: None })
            .await?;
        info!("tier access granted to account {}", ctx.account_id);
        Ok(record)
    }

    /// Set `{gcp_access: true, admin: is_admin}` on the account looked up by
    /// email. Admin-only in the general form; while no administrator exists
    /// yet, a caller on the bootstrap allow-list may elevate their own email.
    pub async fn set_admin_claims(
        &self,
        ctx: &AuthContext,
        email: &str,
        is_admin: bool,
    ) -> Result<AccountRecord, GrantError> {
        if !ctx.admin {
            let bootstrap_allowed = !self.identity.any_admin().await?
                && self.bootstrap_admin_emails.iter().any(|e| e == &ctx.email)
                && ctx.email == email;
            if !bootstrap_allowed {
                return Err(GrantError::PermissionDenied(
                    "administrator claim required to change admin claims".to_string(),
                ));
            }
        }

        let target = self
            .identity
            .find_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))?;

        let record = self
            .identity
            .set_claims(
                &target.uid,
                ClaimsUpdate { admin: Some(is_admin), gcp_access: Some(true) },
            )
            .await?;
        info!("admin claim for {} set to {}", email, is_admin);
        Ok(record)
    }
}
