//! Migration engine: the hot→cold (archive) and cold→hot (retrieve)
//! transfer protocols.
//!
//! Archive is a five-step protocol whose commit point is the metadata index
//! write; retrieve treats every requested file as an independent unit and
//! never escalates a per-item failure to a call-level error. Both directions
//! work against injected storage adapters, so tests substitute in-memory
//! fakes with fault injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::index::{IndexError, MetadataIndex};
use crate::storage::{
    object_key, validate_file_name, ObjectStore, StoreError, DEFAULT_CONTENT_TYPE,
};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid file name: {0}")]
    InvalidFileName(String),
    #[error("failed to fetch source {url}: {detail}")]
    SourceFetch { url: String, detail: String },
    #[error("file not in archive: {0}")]
    SourceMissing(String),
    #[error("staging error: {0}")]
    Staging(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Per-item failure in a batch retrieve.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FailedRetrieve {
    pub name: String,
    pub reason: String,
}

/// Batch retrieve result: item outcomes, never a call-level error.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RetrieveReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedRetrieve>,
}

impl RetrieveReport {
    pub fn message(&self) -> String {
        if self.failed.is_empty() {
            format!("{} file(s) retrieved from archive", self.succeeded.len())
        } else {
            format!(
                "{} file(s) retrieved, {} failed",
                self.succeeded.len(),
                self.failed.len()
            )
        }
    }
}

/// On-disk staging file, unlinked on drop on every exit path. A cleanup
/// failure is logged, never surfaced.
struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    async fn write(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("stage-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove staging file {}: {}", self.path.display(), e);
            }
        }
    }
}

pub struct MigrationEngine {
    hot: Arc<dyn ObjectStore>,
    cold: Arc<dyn ObjectStore>,
    index: Arc<dyn MetadataIndex>,
    http: reqwest::Client,
    staging_dir: PathBuf,
    cold_bucket: String,
}

impl MigrationEngine {
    pub fn new(
        hot: Arc<dyn ObjectStore>,
        cold: Arc<dyn ObjectStore>,
        index: Arc<dyn MetadataIndex>,
        staging_dir: impl Into<PathBuf>,
        cold_bucket: impl Into<String>,
    ) -> Self {
        Self {
            hot,
            cold,
            index,
            http: reqwest::Client::new(),
            staging_dir: staging_dir.into(),
            cold_bucket: cold_bucket.into(),
        }
    }

    pub fn cold_url(&self, key: &str) -> String {
        format!("archive://{}/{}", self.cold_bucket, key)
    }

    /// Archive a hot-tier file into the cold bucket.
    ///
    /// Steps: fetch source bytes → stage to disk → cold put at the
    /// deterministic `{uid}/{name}` key → index upsert (commit point) → hot
    /// delete. A fetch or cold-put failure aborts with the hot object
    /// untouched; a hot-delete failure after commit leaves a reconcilable
    /// duplicate and is logged only. Retrying is safe: the cold key is
    /// deterministic and the put overwrites.
    pub async fn archive(
        &self,
        ctx: &AuthContext,
        file_name: &str,
        file_url: &str,
    ) -> Result<String, MigrationError> {
        validate_file_name(file_name)
            .map_err(|_| MigrationError::InvalidFileName(file_name.to_string()))?;
        let key = object_key(&ctx.account_id, file_name);

        // Step 1: fetch bytes from the hot-tier reference. Nothing has been
        // mutated yet, so any failure here aborts cleanly.
        let response = self.http.get(file_url).send().await.map_err(|e| {
            MigrationError::SourceFetch { url: file_url.to_string(), detail: e.to_string() }
        })?;
        if !response.status().is_success() {
            return Err(MigrationError::SourceFetch {
                url: file_url.to_string(),
                detail: format!("source returned {}", response.status()),
            });
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await.map_err(|e| MigrationError::SourceFetch {
            url: file_url.to_string(),
            detail: e.to_string(),
        })?;

        // Step 2: stage to disk so the bucket upload streams from a file,
        // not from a long-held buffer. The guard unlinks on every exit path.
        let staged = StagedFile::write(&self.staging_dir, &bytes).await?;
        drop(bytes);

        // Step 3: upload to the cold bucket. Overwrite semantics at a
        // deterministic key make a retry idempotent.
        let data = staged.read().await?;
        self.cold.put(&key, &data, &content_type).await?;

        // Step 4: commit point. Once the index entry is written the file is
        // archived, whatever happens to the hot copy below.
        let cold_url = self.cold_url(&key);
        self.index.upsert(&ctx.account_id, file_name, &cold_url).await?;

        // Step 5: drop the hot copy. Failure leaves a duplicate that a retry
        // of the delete reconciles; the caller still sees success.
        if let Err(e) = self.hot.delete(&key).await {
            warn!("hot copy of {} not removed after archive commit: {}", key, e);
        }

        info!("archived {} to {}", key, cold_url);
        Ok(format!("{} archived to cold storage", file_name))
    }

    /// Retrieve a batch of files from the cold bucket back into the hot tier.
    ///
    /// Items are processed strictly sequentially; a failure on one file never
    /// aborts the rest. Each item walks: cold get → hot put → cold delete →
    /// index remove, and counts as failed if any step fails.
    pub async fn retrieve(&self, ctx: &AuthContext, file_names: &[String]) -> RetrieveReport {
        let mut report = RetrieveReport::default();
        for name in file_names {
            match self.retrieve_one(ctx, name).await {
                Ok(()) => report.succeeded.push(name.clone()),
                Err(e) => {
                    warn!("retrieve of {}/{} failed: {}", ctx.account_id, name, e);
                    report.failed.push(FailedRetrieve { name: name.clone(), reason: e.to_string() });
                }
            }
        }
        report
    }

    /// Retrieve a single file; the per-item unit of the batch above.
    pub async fn retrieve_one(
        &self,
        ctx: &AuthContext,
        file_name: &str,
    ) -> Result<(), MigrationError> {
        validate_file_name(file_name)
            .map_err(|_| MigrationError::InvalidFileName(file_name.to_string()))?;
        let key = object_key(&ctx.account_id, file_name);

        let body = match self.cold.get(&key).await {
            Ok(body) => body,
            Err(StoreError::NotFound(_)) => {
                return Err(MigrationError::SourceMissing(file_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        self.hot.put(&key, &body.bytes, &body.content_type).await?;
        self.cold.delete(&key).await?;
        self.index.remove(&ctx.account_id, file_name).await?;

        info!("retrieved {} from cold storage", key);
        Ok(())
    }
}
