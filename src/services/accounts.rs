//! Account lifecycle manager: admin-only operations over the identity store.
//!
//! Every action is a variant of `AdminAction` resolved by one exhaustive
//! dispatch, so adding an action without handling it is a compile error.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::auth::AuthContext;
use crate::identity::{password, IdentityError, IdentityStore};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("administrator claim required")]
    PermissionDenied,
    #[error("target account id is required")]
    MissingTarget,
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[derive(Debug, Clone)]
pub enum AdminAction {
    ListUsers,
    ResetPassword { uid: String },
    Disable { uid: String },
    Enable { uid: String },
    Delete { uid: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub disabled: bool,
}

#[derive(Debug)]
pub enum AdminOutcome {
    Users(Vec<UserSummary>),
    /// The replacement secret is returned once and never persisted in the
    /// clear.
    PasswordReset { uid: String, new_password: String },
    DisabledSet { uid: String, disabled: bool },
    Deleted { uid: String },
}

pub struct AccountService {
    identity: Arc<dyn IdentityStore>,
    list_page_size: usize,
}

impl AccountService {
    pub fn new(identity: Arc<dyn IdentityStore>, list_page_size: usize) -> Self {
        Self { identity, list_page_size }
    }

    /// Resolve one admin action. The authorization gate runs first: a caller
    /// without the admin claim is refused before any read or mutation.
    pub async fn dispatch(
        &self,
        ctx: &AuthContext,
        action: AdminAction,
    ) -> Result<AdminOutcome, AccountError> {
        if !ctx.admin {
            return Err(AccountError::PermissionDenied);
        }

        match action {
            AdminAction::ListUsers => {
                let users = self.list_all_users().await?;
                Ok(AdminOutcome::Users(users))
            }
            AdminAction::ResetPassword { uid } => {
                let uid = require_uid(uid)?;
                let new_password = password::generate();
                self.identity.set_password(&uid, &password::hash(&new_password)).await?;
                info!("credential reset for account {}", uid);
                Ok(AdminOutcome::PasswordReset { uid, new_password })
            }
            AdminAction::Disable { uid } => {
                let uid = require_uid(uid)?;
                let record = self.identity.set_disabled(&uid, true).await?;
                info!("account {} disabled", uid);
                Ok(AdminOutcome::DisabledSet { uid, disabled: record.disabled })
            }
            AdminAction::Enable { uid } => {
                let uid = require_uid(uid)?;
                let record = self.identity.set_disabled(&uid, false).await?;
                info!("account {} enabled", uid);
                Ok(AdminOutcome::DisabledSet { uid, disabled: record.disabled })
            }
            AdminAction::Delete { uid } => {
                // Terminal and irreversible. The account's files are left in
                // place in both tiers; removal of identity does not cascade
                // to storage.
                let uid = require_uid(uid)?;
                self.identity.delete(&uid).await?;
                info!("account {} deleted", uid);
                Ok(AdminOutcome::Deleted { uid })
            }
        }
    }

    /// Page through the full account set, following the continuation token
    /// until exhausted.
    async fn list_all_users(&self) -> Result<Vec<UserSummary>, AccountError> {
        let mut users = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.identity.list_page(token.as_deref(), self.list_page_size).await?;
            users.extend(page.accounts.into_iter().map(|a| UserSummary {
                uid: a.uid,
                email: a.email,
                display_name: a.display_name,
                disabled: a.disabled,
            }));
            match page.next_page_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        Ok(users)
    }
}

fn require_uid(uid: String) -> Result<String, AccountError> {
    if uid.trim().is_empty() {
        return Err(AccountError::MissingTarget);
    }
    Ok(uid)
}
