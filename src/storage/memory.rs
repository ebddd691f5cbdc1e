//! In-memory object store used by unit tests and ephemeral dev runs.
//!
//! Carries per-operation failure injection so transfer tests can exercise the
//! partial-failure windows without a faulty backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ObjectBody, ObjectStore, StoreError, StoredObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOp {
    Put,
    Delete,
    Get,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, ObjectBody>,
    fail_next: Option<FailOp>,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot failure for the next matching operation.
    pub fn fail_next(&self, op: FailOp) {
        self.inner.lock().unwrap().fail_next = Some(op);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_failure(inner: &mut Inner, op: FailOp) -> Result<(), StoreError> {
        if inner.fail_next == Some(op) {
            inner.fail_next = None;
            return Err(StoreError::Backend(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let want = format!("{}/", prefix);
        let mut objects: Vec<StoredObject> = inner
            .objects
            .iter()
            .filter_map(|(key, body)| {
                key.strip_prefix(&want).map(|name| StoredObject {
                    name: name.to_string(),
                    size_bytes: body.bytes.len() as u64,
                    content_type: body.content_type.clone(),
                })
            })
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_failure(&mut inner, FailOp::Get)?;
        inner
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_failure(&mut inner, FailOp::Put)?;
        inner.objects.insert(
            key.to_string(),
            ObjectBody { bytes: bytes.to_vec(), content_type: content_type.to_string() },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_failure(&mut inner, FailOp::Delete)?;
        inner
            .objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}
