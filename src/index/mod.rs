//! Metadata index over the cold archive.
//!
//! Maps `(ownerAccountId, fileName)` to the cold-bucket location of the file.
//! The index is advisory and reconstructible: cold-tier listings always go to
//! the bucket itself, so a drifted entry (orphaned record, or a cold object
//! briefly missing its record during an archive retry window) never corrupts
//! what the caller sees. Entries are written at archive commit and removed at
//! retrieve commit.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("index backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub owner_uid: String,
    pub file_name: String,
    pub cold_url: String,
    pub archived_at: DateTime<Utc>,
}

#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Insert or overwrite the entry for `(owner_uid, file_name)`.
    async fn upsert(&self, owner_uid: &str, file_name: &str, cold_url: &str)
        -> Result<(), IndexError>;

    /// Remove the entry; removing an absent entry is a no-op.
    async fn remove(&self, owner_uid: &str, file_name: &str) -> Result<(), IndexError>;

    async fn get(&self, owner_uid: &str, file_name: &str)
        -> Result<Option<IndexEntry>, IndexError>;

    async fn list(&self, owner_uid: &str) -> Result<Vec<IndexEntry>, IndexError>;
}
