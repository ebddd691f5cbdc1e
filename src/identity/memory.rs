use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    AccountPage, AccountRecord, ClaimsUpdate, IdentityError, IdentityStore, NewAccount,
};

/// In-memory identity store, uid-ordered for stable pagination.
#[derive(Default)]
pub struct MemoryIdentityStore {
    accounts: Mutex<BTreeMap<String, AccountRecord>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountRecord>, IdentityError> {
        Ok(self.accounts.lock().unwrap().get(uid).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, IdentityError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<AccountRecord, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.email == account.email) {
            return Err(IdentityError::EmailTaken(account.email));
        }
        let record = AccountRecord {
            uid: Uuid::new_v4().simple().to_string(),
            email: account.email,
            display_name: account.display_name,
            disabled: false,
            admin: false,
            gcp_access: false,
            password_hash: account.password_hash,
            created_at: Utc::now(),
        };
        accounts.insert(record.uid.clone(), record.clone());
        Ok(record)
    }

    async fn list_page(
        &self,
        page_token: Option<&str>,
        page_size: usize,
    ) -> Result<AccountPage, IdentityError> {
        let accounts = self.accounts.lock().unwrap();
        let page: Vec<AccountRecord> = match page_token {
            // Keyset continuation: strictly after the token uid
            Some(token) => accounts
                .range::<String, _>((
                    std::ops::Bound::Excluded(token.to_string()),
                    std::ops::Bound::Unbounded,
                ))
                .take(page_size)
                .map(|(_, a)| a.clone())
                .collect(),
            None => accounts.values().take(page_size).cloned().collect(),
        };
        let next_page_token = if page.len() == page_size {
            page.last().map(|a| a.uid.clone())
        } else {
            None
        };
        Ok(AccountPage { accounts: page, next_page_token })
    }

    async fn set_claims(
        &self,
        uid: &str,
        update: ClaimsUpdate,
    ) -> Result<AccountRecord, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts
            .get_mut(uid)
            .ok_or_else(|| IdentityError::NotFound(uid.to_string()))?;
        if let Some(admin) = update.admin {
            record.admin = admin;
        }
        if let Some(gcp_access) = update.gcp_access {
            record.gcp_access = gcp_access;
        }
        Ok(record.clone())
    }

    async fn set_disabled(
        &self,
        uid: &str,
        disabled: bool,
    ) -> Result<AccountRecord, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts
            .get_mut(uid)
            .ok_or_else(|| IdentityError::NotFound(uid.to_string()))?;
        record.disabled = disabled;
        Ok(record.clone())
    }

    async fn set_password(&self, uid: &str, password_hash: &str) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts
            .get_mut(uid)
            .ok_or_else(|| IdentityError::NotFound(uid.to_string()))?;
        record.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete(&self, uid: &str) -> Result<(), IdentityError> {
        self.accounts
            .lock()
            .unwrap()
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| IdentityError::NotFound(uid.to_string()))
    }

    async fn any_admin(&self) -> Result<bool, IdentityError> {
        Ok(self.accounts.lock().unwrap().values().any(|a| a.admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(n: usize) -> MemoryIdentityStore {
        let store = MemoryIdentityStore::new();
        for i in 0..n {
            store
                .create(NewAccount {
                    email: format!("user{}@example.com", i),
                    display_name: None,
                    password_hash: "h".to_string(),
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = seeded(1).await;
        let err = store
            .create(NewAccount {
                email: "user0@example.com".to_string(),
                display_name: None,
                password_hash: "h".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn pagination_covers_all_accounts_exactly_once() {
        let store = seeded(1500).await;
        let mut seen = std::collections::HashSet::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = store.list_page(token.as_deref(), 1000).await.unwrap();
            pages += 1;
            for account in &page.accounts {
                assert!(seen.insert(account.uid.clone()), "duplicate uid across pages");
            }
            match page.next_page_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        assert_eq!(seen.len(), 1500);
        assert_eq!(pages, 2);
    }

    #[tokio::test]
    async fn claims_merge_leaves_other_flag_alone() {
        let store = seeded(1).await;
        let uid = store.find_by_email("user0@example.com").await.unwrap().unwrap().uid;

        store
            .set_claims(&uid, ClaimsUpdate { gcp_access: Some(true), admin: None })
            .await
            .unwrap();
        let record = store
            .set_claims(&uid, ClaimsUpdate { admin: Some(true), gcp_access: None })
            .await
            .unwrap();
        assert!(record.admin);
        assert!(record.gcp_access);
    }

    #[tokio::test]
    async fn disable_enable_round_trip_preserves_identity() {
        let store = seeded(1).await;
        let before = store.find_by_email("user0@example.com").await.unwrap().unwrap();

        let disabled = store.set_disabled(&before.uid, true).await.unwrap();
        assert!(disabled.disabled);
        let enabled = store.set_disabled(&before.uid, false).await.unwrap();
        assert!(!enabled.disabled);
        assert_eq!(enabled.uid, before.uid);
        assert_eq!(enabled.email, before.email);
    }
}
