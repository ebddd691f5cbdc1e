//! Filesystem-backed object store.
//!
//! Objects live at `{root}/{accountId}/{fileName}`; content types are kept in
//! a `.ct/` sidecar directory inside each account prefix so listings stay
//! byte-for-byte what the user uploaded.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ObjectBody, ObjectStore, StoreError, StoredObject, DEFAULT_CONTENT_TYPE};

const SIDECAR_DIR: &str = ".ct";

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn split_key(key: &str) -> Result<(&str, &str), StoreError> {
        let (prefix, name) = key
            .split_once('/')
            .ok_or_else(|| StoreError::InvalidKey(format!("key missing account prefix: {}", key)))?;
        if prefix.is_empty() || name.is_empty() || name.contains('/') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        super::validate_file_name(name)?;
        Ok((prefix, name))
    }

    fn object_path(&self, prefix: &str, name: &str) -> PathBuf {
        self.root.join(prefix).join(name)
    }

    fn sidecar_path(&self, prefix: &str, name: &str) -> PathBuf {
        self.root.join(prefix).join(SIDECAR_DIR).join(name)
    }

    async fn read_content_type(&self, prefix: &str, name: &str) -> String {
        match fs::read_to_string(self.sidecar_path(prefix, name)).await {
            Ok(ct) if !ct.trim().is_empty() => ct.trim().to_string(),
            _ => DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError> {
        let dir = self.root.join(prefix);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(e) => e,
            // An account that has never stored anything simply has no directory
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(n) => n,
                Err(_) => continue,
            };
            if name.starts_with('.') {
                continue;
            }
            let content_type = self.read_content_type(prefix, &name).await;
            objects.push(StoredObject { name, size_bytes: meta.len(), content_type });
        }
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StoreError> {
        let (prefix, name) = Self::split_key(key)?;
        let bytes = match fs::read(self.object_path(prefix, name)).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let content_type = self.read_content_type(prefix, name).await;
        Ok(ObjectBody { bytes, content_type })
    }

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let (prefix, name) = Self::split_key(key)?;
        let path = self.object_path(prefix, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;

        let sidecar = self.sidecar_path(prefix, name);
        if let Some(parent) = sidecar.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&sidecar, content_type).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let (prefix, name) = Self::split_key(key)?;
        match fs::remove_file(self.object_path(prefix, name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        }
        // Sidecar removal is best-effort; a stale record is harmless
        if let Err(e) = fs::remove_file(self.sidecar_path(prefix, name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("failed to remove content-type sidecar for {}: {}", key, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let (_dir, store) = store();
        store.put("u1/a.txt", b"hello", "text/plain").await.unwrap();

        let body = store.get("u1/a.txt").await.unwrap();
        assert_eq!(body.bytes, b"hello");
        assert_eq!(body.content_type, "text/plain");

        store.delete("u1/a.txt").await.unwrap();
        assert!(matches!(store.get("u1/a.txt").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_is_scoped_to_prefix_and_skips_sidecars() {
        let (_dir, store) = store();
        store.put("u1/a.txt", b"a", "text/plain").await.unwrap();
        store.put("u1/b.bin", b"bb", "application/octet-stream").await.unwrap();
        store.put("u2/c.txt", b"c", "text/plain").await.unwrap();

        let listed = store.list("u1").await.unwrap();
        let names: Vec<_> = listed.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.bin"]);
        assert_eq!(listed[1].size_bytes, 2);

        assert!(store.list("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_octet_stream() {
        let (dir, store) = store();
        tokio::fs::create_dir_all(dir.path().join("u1")).await.unwrap();
        tokio::fs::write(dir.path().join("u1/raw.dat"), b"x").await.unwrap();

        let body = store.get("u1/raw.dat").await.unwrap();
        assert_eq!(body.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn rejects_keys_without_prefix() {
        let (_dir, store) = store();
        assert!(matches!(store.get("nakedkey").await, Err(StoreError::InvalidKey(_))));
    }
}
