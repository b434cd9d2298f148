//! Orchestrates a full publish: repository bootstrap, file sync, and Pages
//! enablement.
//!
//! Repository creation gates everything else: when the credentials are
//! rejected or the repository cannot be created, no file is attempted. Once
//! the repository exists, per-file failures and a refused Pages request are
//! reported rather than raised.

use std::fmt::Display;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{ContentStore, PagesHost, PagesStatus, RepositorySpec, RepositoryStatus};
use crate::sync::{SyncError, SyncReport, Syncer, TreeWalker};

/// Errors that stop a deployment before or during the sync.
#[derive(Debug, Error)]
pub enum DeployError<HostError>
where
    HostError: std::error::Error + 'static,
{
    /// Raised when the provider rejects the credentials.
    #[error("authentication rejected with status {status}: {body}")]
    Unauthorized {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Response body.
        body: String,
    },
    /// Raised when the repository can be neither created nor reused.
    #[error("repository creation failed with status {status}: {body}")]
    Repository {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Raised when the repository request never reached the provider.
    #[error("repository request failed: {0}")]
    RepositoryRequest(#[source] HostError),
    /// Raised when the sync cannot start.
    #[error("sync failed: {0}")]
    Sync(#[source] SyncError),
}

/// Caller supplied deployment options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeployRequest {
    /// Description set on a newly created repository.
    pub description: String,
    /// Whether a newly created repository is private.
    pub private: bool,
    /// Whether to switch on Pages hosting after the upload.
    pub enable_pages: bool,
}

/// How the repository was obtained.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RepositoryOutcome {
    /// A new repository was created.
    Created,
    /// An existing repository was reused.
    Reused,
}

/// What happened to the Pages enablement step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PagesOutcome {
    /// The step was not requested.
    Skipped,
    /// Pages hosting was switched on.
    Enabled,
    /// Pages hosting was already on.
    AlreadyEnabled,
    /// The request failed; the uploaded files are unaffected.
    Failed(String),
}

impl PagesOutcome {
    /// Returns `true` unless the step failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Summary of a deployment that got past repository bootstrap.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeployReport {
    /// Browser URL of the repository.
    pub repository_url: String,
    /// URL the site is served from.
    pub pages_url: String,
    /// How the repository was obtained.
    pub repository: RepositoryOutcome,
    /// Per-file results.
    pub sync: SyncReport,
    /// Result of the Pages step.
    pub pages: PagesOutcome,
}

impl DeployReport {
    /// Returns `true` when every file and the Pages step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.sync.has_failures() && self.pages.is_success()
    }
}

/// Executes the deployment flow using the provided host and syncer.
#[derive(Debug)]
pub struct DeployOrchestrator<H, S: ContentStore> {
    host: H,
    syncer: Syncer<S>,
}

impl<H, S> DeployOrchestrator<H, S>
where
    H: PagesHost,
    H::Error: Display,
    S: ContentStore,
{
    /// Creates a new orchestrator.
    #[must_use]
    pub const fn new(host: H, syncer: Syncer<S>) -> Self {
        Self { host, syncer }
    }

    /// Runs the deployment and returns the per-stage report.
    ///
    /// The source directory is checked before any remote call, so a missing
    /// build never creates an empty repository.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError`] when the repository cannot be created or
    /// reused, or when `source` is not a directory.
    pub async fn execute(
        &self,
        request: &DeployRequest,
        source: &Utf8Path,
    ) -> Result<DeployReport, DeployError<H::Error>> {
        TreeWalker::new(source).map_err(DeployError::Sync)?;
        let repository = self.ensure_repository(request).await?;
        let sync = self
            .syncer
            .sync(source)
            .await
            .map_err(DeployError::Sync)?;
        let pages = if request.enable_pages {
            self.enable_pages().await
        } else {
            PagesOutcome::Skipped
        };

        let repository_id = self.syncer.repository();
        Ok(DeployReport {
            repository_url: repository_id.html_url(),
            pages_url: repository_id.pages_url(),
            repository,
            sync,
            pages,
        })
    }

    async fn ensure_repository(
        &self,
        request: &DeployRequest,
    ) -> Result<RepositoryOutcome, DeployError<H::Error>> {
        let repository = self.syncer.repository().clone();
        let spec = RepositorySpec {
            homepage: repository.pages_url(),
            repository,
            description: request.description.clone(),
            private: request.private,
        };

        let status = self
            .host
            .create_repository(&spec)
            .await
            .map_err(DeployError::RepositoryRequest)?;
        match status {
            RepositoryStatus::Created { html_url } => {
                info!(
                    repository = %spec.repository,
                    url = html_url.as_deref().unwrap_or_default(),
                    "repository created"
                );
                Ok(RepositoryOutcome::Created)
            }
            RepositoryStatus::AlreadyExists => {
                info!(repository = %spec.repository, "repository already exists, continuing");
                Ok(RepositoryOutcome::Reused)
            }
            RepositoryStatus::Unauthorized { status, body } => {
                Err(DeployError::Unauthorized { status, body })
            }
            RepositoryStatus::Rejected { status, body } => {
                Err(DeployError::Repository { status, body })
            }
        }
    }

    async fn enable_pages(&self) -> PagesOutcome {
        let repository = self.syncer.repository();
        let branch = &self.syncer.config().branch;
        let outcome = match self.host.enable_pages(repository, branch).await {
            Ok(PagesStatus::Enabled) => PagesOutcome::Enabled,
            Ok(PagesStatus::AlreadyEnabled) => PagesOutcome::AlreadyEnabled,
            Ok(PagesStatus::Rejected { status, body }) => {
                PagesOutcome::Failed(format!("status {status}: {body}"))
            }
            Err(err) => PagesOutcome::Failed(err.to_string()),
        };
        if let PagesOutcome::Failed(ref detail) = outcome {
            warn!(repository = %repository, detail = %detail, "pages enablement failed");
        }
        outcome
    }
}
