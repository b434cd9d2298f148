//! Idempotent bulk upload of a local directory tree to a path-addressed
//! content store.
//!
//! Every regular file under the source directory is processed on its own:
//! oversize files are skipped, ancestor directories are materialised as
//! `.gitkeep` placeholders, the file's current revision is probed, and the
//! file is created or updated. A failing item is recorded and the run moves
//! on; re-running over the same tree is safe and turns creates into updates.

use camino::Utf8Path;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::store::{
    ContentStore, ProbeOutcome, RemoteTarget, RepositoryId, UpsertOutcome, UpsertRequest,
};

mod config;
mod path;
mod types;
mod walker;

pub use config::{
    DEFAULT_BRANCH, DEFAULT_PACING_DELAY_MS, DEFAULT_SIZE_CEILING_BYTES, SyncConfig,
    SyncConfigLoadError, SyncError,
};
pub use path::{PLACEHOLDER_FILE_NAME, ResolvedPath, placeholder_path, resolve_remote_path};
pub use types::{
    PlaceholderResult, PlaceholderStatus, SyncItem, SyncOutcome, SyncReport, SyncResult,
};
pub use walker::TreeWalker;

/// Uploads a directory tree into one repository branch.
#[derive(Clone, Debug)]
pub struct Syncer<S: ContentStore> {
    config: SyncConfig,
    repository: RepositoryId,
    store: S,
}

impl<S: ContentStore> Syncer<S> {
    /// Creates a new syncer writing to `repository` through `store`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] when configuration validation
    /// fails.
    pub fn new(config: SyncConfig, repository: RepositoryId, store: S) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            config,
            repository,
            store,
        })
    }

    /// Returns a reference to the underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Repository receiving the uploads.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    /// Uploads every regular file below `source`.
    ///
    /// Items are processed strictly one after another and the pacing delay
    /// is awaited after each of them, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingSource`] when `source` is not a directory.
    /// Per-item problems never surface here; they are recorded in the
    /// returned [`SyncReport`].
    pub async fn sync(&self, source: &Utf8Path) -> Result<SyncReport, SyncError> {
        let walker = TreeWalker::new(source)?;
        let mut report = SyncReport::default();

        for entry in walker {
            let result = match entry {
                Ok(item) => self.sync_item(&item).await,
                Err(err) => SyncResult::failed(err.path(), err.to_string()),
            };
            log_result(&result);
            report.results.push(result);
            sleep(self.config.pacing_delay()).await;
        }

        Ok(report)
    }

    /// Runs one item through size check, placeholders, probe and upsert.
    pub async fn sync_item(&self, item: &SyncItem) -> SyncResult {
        let resolved = match resolve_remote_path(item.relative_path()) {
            Ok(resolved) => resolved,
            Err(err) => return SyncResult::failed(item.relative_path().as_str(), err.to_string()),
        };
        if item.size_bytes() > self.config.size_ceiling_bytes {
            return SyncResult::new(resolved.remote_path, SyncOutcome::SkippedTooLarge);
        }

        let content = match item.read_content() {
            Ok(content) => content,
            Err(err) => return SyncResult::failed(resolved.remote_path, err.to_string()),
        };

        let placeholders = self.ensure_placeholders(&resolved.ancestors).await;
        let target = self.target(resolved.remote_path.clone());
        let result = self.write_file(&target, content).await;
        result.with_placeholders(placeholders)
    }

    async fn write_file(&self, target: &RemoteTarget, content: Vec<u8>) -> SyncResult {
        let path = target.remote_path.clone();
        let revision = match self.store.probe(target).await {
            Ok(ProbeOutcome::Present { revision }) => revision,
            Ok(ProbeOutcome::Absent) => None,
            Ok(ProbeOutcome::Unexpected { status, body }) => {
                return SyncResult::failed(path, format!("probe returned status {status}: {body}"));
            }
            Err(err) => return SyncResult::failed(path, format!("probe failed: {err}")),
        };

        let (outcome, message) = match revision {
            Some(_) => (SyncOutcome::Updated, format!("Update {path}")),
            None => (SyncOutcome::Created, format!("Add {path}")),
        };
        debug!(path = %path, updating = revision.is_some(), "uploading file");

        let request = UpsertRequest {
            target: target.clone(),
            content,
            message,
            revision,
        };
        match self.store.upsert(&request).await {
            Ok(UpsertOutcome::Written { .. }) => SyncResult::new(path, outcome),
            Ok(UpsertOutcome::Rejected { status, body }) => {
                SyncResult::failed(path, format!("upload returned status {status}: {body}"))
            }
            Err(err) => SyncResult::failed(path, format!("upload failed: {err}")),
        }
    }

    /// Probes and, when needed, creates the placeholder of every prefix.
    ///
    /// Inconclusive probes count as absent; every failure is kept in the
    /// returned list and never stops the item.
    async fn ensure_placeholders(&self, ancestors: &[String]) -> Vec<PlaceholderResult> {
        let mut results = Vec::with_capacity(ancestors.len());
        for prefix in ancestors {
            let target = self.target(placeholder_path(prefix));
            let status = match self.store.probe(&target).await {
                Ok(ProbeOutcome::Present { .. }) => PlaceholderStatus::Present,
                Ok(ProbeOutcome::Absent) => self.create_placeholder(prefix, target).await,
                Ok(ProbeOutcome::Unexpected { status, .. }) => {
                    debug!(prefix = %prefix, status, "placeholder probe inconclusive");
                    self.create_placeholder(prefix, target).await
                }
                Err(err) => {
                    debug!(prefix = %prefix, error = %err, "placeholder probe failed");
                    self.create_placeholder(prefix, target).await
                }
            };
            if let PlaceholderStatus::Failed(ref detail) = status {
                warn!(prefix = %prefix, detail = %detail, "directory placeholder not created");
            }
            results.push(PlaceholderResult {
                prefix: prefix.clone(),
                status,
            });
        }
        results
    }

    async fn create_placeholder(&self, prefix: &str, target: RemoteTarget) -> PlaceholderStatus {
        let request = UpsertRequest {
            target,
            content: Vec::new(),
            message: format!("Create directory {prefix}"),
            revision: None,
        };
        match self.store.upsert(&request).await {
            Ok(UpsertOutcome::Written { .. }) => PlaceholderStatus::Created,
            Ok(UpsertOutcome::Rejected { status, body }) => {
                PlaceholderStatus::Failed(format!("status {status}: {body}"))
            }
            Err(err) => PlaceholderStatus::Failed(err.to_string()),
        }
    }

    fn target(&self, remote_path: String) -> RemoteTarget {
        RemoteTarget {
            repository: self.repository.clone(),
            remote_path,
            branch: self.config.branch.clone(),
        }
    }
}

fn log_result(result: &SyncResult) {
    match result.outcome {
        SyncOutcome::Failed => warn!(
            path = %result.relative_path,
            detail = result.error_detail.as_deref().unwrap_or_default(),
            "upload failed"
        ),
        outcome => info!(path = %result.relative_path, outcome = %outcome, "processed"),
    }
}
