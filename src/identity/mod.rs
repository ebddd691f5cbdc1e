//! Identity & claims store.
//!
//! Durable per-account record of role flags attached to an opaque account id.
//! This is the source of truth for authorization decisions; session tokens
//! carry a snapshot of these flags and must be re-issued to pick up changes.

pub mod memory;
pub mod password;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("invalid page token: {0}")]
    InvalidPageToken(String),
    #[error("identity database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("identity backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccountRecord {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub disabled: bool,
    pub admin: bool,
    pub gcp_access: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
}

/// Merge-write of role claims; `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsUpdate {
    pub admin: Option<bool>,
    pub gcp_access: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<AccountRecord>,
    /// Continuation token; `None` when the set is exhausted.
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountRecord>, IdentityError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, IdentityError>;

    /// Create an account with a fresh opaque uid. Fails on a duplicate email.
    async fn create(&self, account: NewAccount) -> Result<AccountRecord, IdentityError>;

    /// One page of accounts in uid order; pass the previous page's token to
    /// continue. Ordering is stable per backend but not part of the contract.
    async fn list_page(
        &self,
        page_token: Option<&str>,
        page_size: usize,
    ) -> Result<AccountPage, IdentityError>;

    /// Merge role claims into the record, leaving other fields intact.
    async fn set_claims(
        &self,
        uid: &str,
        update: ClaimsUpdate,
    ) -> Result<AccountRecord, IdentityError>;

    async fn set_disabled(&self, uid: &str, disabled: bool)
        -> Result<AccountRecord, IdentityError>;

    async fn set_password(&self, uid: &str, password_hash: &str) -> Result<(), IdentityError>;

    /// Terminal and irreversible; does not touch the account's stored files.
    async fn delete(&self, uid: &str) -> Result<(), IdentityError>;

    /// Whether any administrator account exists (bootstrap-window check).
    async fn any_admin(&self) -> Result<bool, IdentityError>;
}
