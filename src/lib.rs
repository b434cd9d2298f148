//! Core library for the pagedrop static publishing tool.
//!
//! The crate freezes a running web application into a directory of static
//! files and publishes that directory to a GitHub repository served through
//! GitHub Pages. Uploads go through a path-addressed [`ContentStore`] so the
//! sync engine stays independent of the hosting provider.

pub mod config;
pub mod deploy;
pub mod freeze;
pub mod github;
pub mod store;
pub mod sync;
pub mod test_support;

pub use config::{ConfigError, GithubConfig};
pub use deploy::{
    DeployError, DeployOrchestrator, DeployReport, DeployRequest, PagesOutcome, RepositoryOutcome,
};
pub use freeze::{FreezeConfig, FreezeError, FreezeReport, Freezer, HttpPageSource, PageSource};
pub use github::{GithubClient, GithubError};
pub use store::{
    ContentStore, PagesHost, PagesStatus, ProbeOutcome, RemoteTarget, RepositoryId,
    RepositorySpec, RepositoryStatus, RevisionMarker, StoreFuture, UpsertOutcome, UpsertRequest,
};
pub use sync::{
    SyncConfig, SyncConfigLoadError, SyncError, SyncItem, SyncOutcome, SyncReport, SyncResult,
    Syncer,
};
