use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{IndexEntry, IndexError, MetadataIndex};

/// Postgres-backed metadata index.
pub struct PgMetadataIndex {
    pool: PgPool,
}

impl PgMetadataIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the index table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), IndexError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS archive_index (
                owner_uid   TEXT NOT NULL,
                file_name   TEXT NOT NULL,
                cold_url    TEXT NOT NULL,
                archived_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (owner_uid, file_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataIndex for PgMetadataIndex {
    async fn upsert(
        &self,
        owner_uid: &str,
        file_name: &str,
        cold_url: &str,
    ) -> Result<(), IndexError> {
        sqlx::query(
            "INSERT INTO archive_index (owner_uid, file_name, cold_url, archived_at) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (owner_uid, file_name) \
             DO UPDATE SET cold_url = EXCLUDED.cold_url, archived_at = now()",
        )
        .bind(owner_uid)
        .bind(file_name)
        .bind(cold_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, owner_uid: &str, file_name: &str) -> Result<(), IndexError> {
        sqlx::query("DELETE FROM archive_index WHERE owner_uid = $1 AND file_name = $2")
            .bind(owner_uid)
            .bind(file_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(
        &self,
        owner_uid: &str,
        file_name: &str,
    ) -> Result<Option<IndexEntry>, IndexError> {
        let row: Option<(String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT owner_uid, file_name, cold_url, archived_at \
             FROM archive_index WHERE owner_uid = $1 AND file_name = $2",
        )
        .bind(owner_uid)
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(owner_uid, file_name, cold_url, archived_at)| IndexEntry {
            owner_uid,
            file_name,
            cold_url,
            archived_at,
        }))
    }

    async fn list(&self, owner_uid: &str) -> Result<Vec<IndexEntry>, IndexError> {
        let rows: Vec<(String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT owner_uid, file_name, cold_url, archived_at \
             FROM archive_index WHERE owner_uid = $1 ORDER BY file_name",
        )
        .bind(owner_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(owner_uid, file_name, cold_url, archived_at)| IndexEntry {
                owner_uid,
                file_name,
                cold_url,
                archived_at,
            })
            .collect())
    }
}
