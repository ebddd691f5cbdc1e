use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AccountPage, AccountRecord, ClaimsUpdate, IdentityError, IdentityStore, NewAccount,
};

/// Postgres-backed identity store.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the accounts table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), IdentityError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                uid           TEXT PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                display_name  TEXT,
                disabled      BOOLEAN NOT NULL DEFAULT false,
                admin         BOOLEAN NOT NULL DEFAULT false,
                gcp_access    BOOLEAN NOT NULL DEFAULT false,
                password_hash TEXT NOT NULL,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

const COLUMNS: &str =
    "uid, email, display_name, disabled, admin, gcp_access, password_hash, created_at";

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AccountRecord>, IdentityError> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "SELECT {} FROM accounts WHERE uid = $1",
            COLUMNS
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, IdentityError> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn create(&self, account: NewAccount) -> Result<AccountRecord, IdentityError> {
        let uid = Uuid::new_v4().simple().to_string();
        let result = sqlx::query_as::<_, AccountRecord>(&format!(
            "INSERT INTO accounts (uid, email, display_name, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            COLUMNS
        ))
        .bind(&uid)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(IdentityError::EmailTaken(account.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_page(
        &self,
        page_token: Option<&str>,
        page_size: usize,
    ) -> Result<AccountPage, IdentityError> {
        // Keyset pagination over uid; the token is the last uid of the
        // previous page
        let accounts = match page_token {
            Some(token) => {
                sqlx::query_as::<_, AccountRecord>(&format!(
                    "SELECT {} FROM accounts WHERE uid > $1 ORDER BY uid LIMIT $2",
                    COLUMNS
                ))
                .bind(token)
                .bind(page_size as i64)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AccountRecord>(&format!(
                    "SELECT {} FROM accounts ORDER BY uid LIMIT $1",
                    COLUMNS
                ))
                .bind(page_size as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let next_page_token = if accounts.len() == page_size {
            accounts.last().map(|a| a.uid.clone())
        } else {
            None
        };
        Ok(AccountPage { accounts, next_page_token })
    }

    async fn set_claims(
        &self,
        uid: &str,
        update: ClaimsUpdate,
    ) -> Result<AccountRecord, IdentityError> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "UPDATE accounts SET \
                 admin = COALESCE($2, admin), \
                 gcp_access = COALESCE($3, gcp_access) \
             WHERE uid = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(uid)
        .bind(update.admin)
        .bind(update.gcp_access)
        .fetch_optional(&self.pool)
        .await?;
        record.ok_or_else(|| IdentityError::NotFound(uid.to_string()))
    }

    async fn set_disabled(
        &self,
        uid: &str,
        disabled: bool,
    ) -> Result<AccountRecord, IdentityError> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "UPDATE accounts SET disabled = $2 WHERE uid = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(uid)
        .bind(disabled)
        .fetch_optional(&self.pool)
        .await?;
        record.ok_or_else(|| IdentityError::NotFound(uid.to_string()))
    }

    async fn set_password(&self, uid: &str, password_hash: &str) -> Result<(), IdentityError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE uid = $1")
            .bind(uid)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound(uid.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, uid: &str) -> Result<(), IdentityError> {
        let result = sqlx::query("DELETE FROM accounts WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound(uid.to_string()));
        }
        Ok(())
    }

    async fn any_admin(&self) -> Result<bool, IdentityError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE admin = true")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }
}
