use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{IndexEntry, IndexError, MetadataIndex};

/// In-memory metadata index for tests and ephemeral dev runs.
#[derive(Default)]
pub struct MemoryMetadataIndex {
    entries: Mutex<HashMap<(String, String), IndexEntry>>,
    fail_next_upsert: Mutex<bool>,
}

impl MemoryMetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot failure for the next upsert.
    pub fn fail_next_upsert(&self) {
        *self.fail_next_upsert.lock().unwrap() = true;
    }
}

#[async_trait]
impl MetadataIndex for MemoryMetadataIndex {
    async fn upsert(
        &self,
        owner_uid: &str,
        file_name: &str,
        cold_url: &str,
    ) -> Result<(), IndexError> {
        if std::mem::take(&mut *self.fail_next_upsert.lock().unwrap()) {
            return Err(IndexError::Backend("injected upsert failure".to_string()));
        }
        let entry = IndexEntry {
            owner_uid: owner_uid.to_string(),
            file_name: file_name.to_string(),
            cold_url: cold_url.to_string(),
            archived_at: Utc::now(),
        };
        self.entries
            .lock()
            .unwrap()
            .insert((owner_uid.to_string(), file_name.to_string()), entry);
        Ok(())
    }

    async fn remove(&self, owner_uid: &str, file_name: &str) -> Result<(), IndexError> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(owner_uid.to_string(), file_name.to_string()));
        Ok(())
    }

    async fn get(
        &self,
        owner_uid: &str,
        file_name: &str,
    ) -> Result<Option<IndexEntry>, IndexError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&(owner_uid.to_string(), file_name.to_string()))
            .cloned())
    }

    async fn list(&self, owner_uid: &str) -> Result<Vec<IndexEntry>, IndexError> {
        let mut entries: Vec<IndexEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.owner_uid == owner_uid)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_overwrites_and_remove_is_idempotent() {
        let index = MemoryMetadataIndex::new();
        index.upsert("u1", "a.txt", "gs://bucket/u1/a.txt").await.unwrap();
        index.upsert("u1", "a.txt", "gs://bucket2/u1/a.txt").await.unwrap();

        let entry = index.get("u1", "a.txt").await.unwrap().unwrap();
        assert_eq!(entry.cold_url, "gs://bucket2/u1/a.txt");

        index.remove("u1", "a.txt").await.unwrap();
        index.remove("u1", "a.txt").await.unwrap();
        assert!(index.get("u1", "a.txt").await.unwrap().is_none());
    }
}
