//! Abstraction over the remote content store and the static hosting API.
//!
//! The sync executor only needs two primitives from a hosting provider: a
//! path-addressed probe and a path-addressed upsert. Repository bootstrap and
//! Pages enablement live on a separate trait so tests can script each side
//! independently.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Future returned by store operations.
pub type StoreFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Owner and name of a hosted repository.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RepositoryId {
    /// Account or organisation that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepositoryId {
    /// Builds an identifier, trimming surrounding whitespace.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into().trim().to_owned(),
            name: name.into().trim().to_owned(),
        }
    }

    /// Browser URL of the repository.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    /// URL the static site is served from once Pages is enabled.
    #[must_use]
    pub fn pages_url(&self) -> String {
        format!("https://{}.github.io/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Opaque version identifier of a remote object (the blob SHA on GitHub).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RevisionMarker(String);

impl RevisionMarker {
    /// Wraps a provider supplied revision string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw revision string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of a single object in the remote store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteTarget {
    /// Repository holding the object.
    pub repository: RepositoryId,
    /// Forward-slash separated path relative to the repository root.
    pub remote_path: String,
    /// Branch the object is read from and written to.
    pub branch: String,
}

/// Result of probing a remote path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProbeOutcome {
    /// Something exists at the path. Directory listings carry no revision.
    Present {
        /// Current revision of the object, when the path names a file.
        revision: Option<RevisionMarker>,
    },
    /// Nothing exists at the path.
    Absent,
    /// The store answered with a status that is neither found nor missing.
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
}

/// Single create-or-replace write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpsertRequest {
    /// Destination of the write.
    pub target: RemoteTarget,
    /// Raw file content; encoding for transport is the store's concern.
    pub content: Vec<u8>,
    /// Commit message recorded with the write.
    pub message: String,
    /// Revision being replaced. `None` requests a create.
    pub revision: Option<RevisionMarker>,
}

/// Result of an upsert that reached the store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UpsertOutcome {
    /// The store accepted the write.
    Written {
        /// Revision of the object after the write, when reported.
        revision: Option<RevisionMarker>,
    },
    /// The store refused the write.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
}

/// Parameters for creating the hosting repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepositorySpec {
    /// Repository to create.
    pub repository: RepositoryId,
    /// Short description shown on the repository page.
    pub description: String,
    /// Homepage advertised on the repository page.
    pub homepage: String,
    /// Whether the repository is private.
    pub private: bool,
}

/// Result of a repository creation request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RepositoryStatus {
    /// The repository was created.
    Created {
        /// Browser URL reported by the provider.
        html_url: Option<String>,
    },
    /// A repository with the same name already exists.
    AlreadyExists,
    /// The credentials were rejected.
    Unauthorized {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Response body.
        body: String,
    },
    /// Any other refusal.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Result of a Pages enablement request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PagesStatus {
    /// Pages hosting was switched on.
    Enabled,
    /// Pages hosting was already configured.
    AlreadyEnabled,
    /// The provider refused the request.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Path-addressed object store used by the sync executor.
pub trait ContentStore {
    /// Transport level error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads `target` and reports whether it exists and at which revision.
    fn probe<'a>(&'a self, target: &'a RemoteTarget)
    -> StoreFuture<'a, ProbeOutcome, Self::Error>;

    /// Creates or replaces the object described by `request`.
    fn upsert<'a>(
        &'a self,
        request: &'a UpsertRequest,
    ) -> StoreFuture<'a, UpsertOutcome, Self::Error>;
}

/// Repository and static hosting management.
pub trait PagesHost {
    /// Transport level error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates the repository described by `spec`.
    fn create_repository<'a>(
        &'a self,
        spec: &'a RepositorySpec,
    ) -> StoreFuture<'a, RepositoryStatus, Self::Error>;

    /// Publishes `branch` of `repository` through static page hosting.
    fn enable_pages<'a>(
        &'a self,
        repository: &'a RepositoryId,
        branch: &'a str,
    ) -> StoreFuture<'a, PagesStatus, Self::Error>;
}
