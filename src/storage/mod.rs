//! Object storage adapters for the hot and cold tiers.
//!
//! Both tiers speak the same `ObjectStore` interface; objects are keyed by
//! `{accountId}/{fileName}` so ownership is carried in the key prefix. One
//! explicitly constructed instance serves the hot tier and another the cold
//! bucket - adapters are injected into the migration engine, never reached
//! through process globals.

pub mod fs;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A stored object as seen by listings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// File name relative to the account prefix.
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// Object bytes plus the content type recorded at put time.
#[derive(Debug, Clone)]
pub struct ObjectBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under an account prefix; names are returned relative to it.
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError>;

    async fn get(&self, key: &str) -> Result<ObjectBody, StoreError>;

    /// Overwrites any existing object at `key`.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Build the canonical `{accountId}/{fileName}` key.
pub fn object_key(account_id: &str, file_name: &str) -> String {
    format!("{}/{}", account_id, file_name)
}

/// Reject names that would escape the account prefix.
pub fn validate_file_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > 1024 {
        return Err(StoreError::InvalidKey(format!(
            "file name must be 1-1024 characters, got {}",
            name.len()
        )));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(StoreError::InvalidKey(format!(
            "file name may not contain path separators: {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_prefixed_keys() {
        assert_eq!(object_key("acct-1", "report.pdf"), "acct-1/report.pdf");
    }

    #[test]
    fn rejects_traversal_names() {
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("a/b.txt").is_err());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("notes.txt").is_ok());
    }
}
