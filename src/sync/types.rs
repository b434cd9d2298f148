//! Items flowing through the sync executor and the results it records.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use super::SyncError;

/// Regular file discovered by the tree walker.
///
/// Content is read on demand so files over the size ceiling never reach
/// memory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncItem {
    relative_path: Utf8PathBuf,
    absolute_path: Utf8PathBuf,
    size_bytes: u64,
}

impl SyncItem {
    /// Describes a file located at `absolute_path`, reachable as
    /// `relative_path` from the sync root.
    #[must_use]
    pub const fn new(relative_path: Utf8PathBuf, absolute_path: Utf8PathBuf, size_bytes: u64) -> Self {
        Self {
            relative_path,
            absolute_path,
            size_bytes,
        }
    }

    /// Path relative to the sync root, in host separator convention.
    #[must_use]
    pub fn relative_path(&self) -> &Utf8Path {
        &self.relative_path
    }

    /// Absolute location on the local filesystem.
    #[must_use]
    pub fn absolute_path(&self) -> &Utf8Path {
        &self.absolute_path
    }

    /// Size reported by the filesystem when the item was discovered.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Reads the file content.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Read`] when the file cannot be read.
    pub fn read_content(&self) -> Result<Vec<u8>, SyncError> {
        std::fs::read(&self.absolute_path).map_err(|err| SyncError::Read {
            path: self.absolute_path.clone(),
            message: err.to_string(),
        })
    }
}

/// Terminal state of a single item.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyncOutcome {
    /// The file did not exist remotely and was written.
    Created,
    /// The file existed remotely and was replaced.
    Updated,
    /// The file exceeded the size ceiling; no remote call was made.
    SkippedTooLarge,
    /// The item could not be written.
    Failed,
}

impl SyncOutcome {
    /// Returns `true` for outcomes that did not fail.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::SkippedTooLarge => "skipped (too large)",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// What happened to one directory placeholder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlaceholderStatus {
    /// The placeholder was already present.
    Present,
    /// The placeholder was written during this run.
    Created,
    /// Writing the placeholder failed; the item carried on regardless.
    Failed(String),
}

/// Best-effort directory materialisation for one ancestor prefix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlaceholderResult {
    /// Directory prefix, forward-slash separated.
    pub prefix: String,
    /// Result of the probe and optional write.
    pub status: PlaceholderStatus,
}

/// Result recorded for every item the walker yields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncResult {
    /// Path relative to the sync root.
    pub relative_path: String,
    /// Terminal state.
    pub outcome: SyncOutcome,
    /// Status and body, or local error text, for failed items.
    pub error_detail: Option<String>,
    /// Placeholder work performed before the file write, root-most first.
    pub placeholders: Vec<PlaceholderResult>,
}

impl SyncResult {
    pub(crate) fn new(relative_path: impl Into<String>, outcome: SyncOutcome) -> Self {
        Self {
            relative_path: relative_path.into(),
            outcome,
            error_detail: None,
            placeholders: Vec::new(),
        }
    }

    pub(crate) fn failed(relative_path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error_detail: Some(detail.into()),
            ..Self::new(relative_path, SyncOutcome::Failed)
        }
    }

    pub(crate) fn with_placeholders(mut self, placeholders: Vec<PlaceholderResult>) -> Self {
        self.placeholders = placeholders;
        self
    }
}

/// Aggregated results of one sync run, in processing order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SyncReport {
    /// One entry per item.
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    /// Number of items that ended in `outcome`.
    #[must_use]
    pub fn count(&self, outcome: SyncOutcome) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome == outcome)
            .count()
    }

    /// Returns `true` when at least one item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|result| !result.outcome.is_success())
    }

    /// Iterates over failed items.
    pub fn failures(&self) -> impl Iterator<Item = &SyncResult> {
        self.results
            .iter()
            .filter(|result| !result.outcome.is_success())
    }

    /// Looks up the result recorded for `relative_path`.
    #[must_use]
    pub fn result_for(&self, relative_path: &str) -> Option<&SyncResult> {
        self.results
            .iter()
            .find(|result| result.relative_path == relative_path)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} skipped, {} failed",
            self.count(SyncOutcome::Created),
            self.count(SyncOutcome::Updated),
            self.count(SyncOutcome::SkippedTooLarge),
            self.count(SyncOutcome::Failed)
        )
    }
}
