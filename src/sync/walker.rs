//! Lazy enumeration of the regular files below a sync root.

use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{SyncError, SyncItem};

/// Iterator over every regular file under a root directory.
///
/// Symlinks and other non-regular entries are skipped. Entries are visited
/// depth-first with siblings sorted by file name. Per-entry problems are
/// yielded as errors so the caller can record them and keep going.
pub struct TreeWalker {
    root: Utf8PathBuf,
    entries: walkdir::IntoIter,
}

impl TreeWalker {
    /// Starts a walk rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingSource`] when `root` is not a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, SyncError> {
        if !root.is_dir() {
            return Err(SyncError::MissingSource {
                path: root.to_path_buf(),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            entries: WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        })
    }

    fn item_from_entry(&self, entry: &DirEntry) -> Result<SyncItem, SyncError> {
        let absolute = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()).map_err(|path| {
            SyncError::NonUtf8Path {
                path: relative_to(&self.root, &path),
            }
        })?;
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|err| SyncError::InvalidPath {
                path: absolute.to_string(),
                reason: err.to_string(),
            })?
            .to_path_buf();
        let metadata = entry.metadata().map_err(|err| SyncError::Walk {
            path: relative.to_string(),
            message: err.to_string(),
        })?;

        Ok(SyncItem::new(relative, absolute, metadata.len()))
    }
}

impl Iterator for TreeWalker {
    type Item = Result<SyncItem, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map_or_else(|| self.root.to_string(), |path| relative_to(&self.root, path));
                    return Some(Err(SyncError::Walk {
                        path,
                        message: err.to_string(),
                    }));
                }
            };

            if entry.file_type().is_file() {
                return Some(self.item_from_entry(&entry));
            }
        }
    }
}

/// Renders `path` relative to the walk root so failures are keyed the same
/// way as per-file results. The root itself, and paths outside it, keep their
/// full rendering.
pub(super) fn relative_to(root: &Utf8Path, path: &Path) -> String {
    match path.strip_prefix(root.as_std_path()) {
        Ok(relative) if !relative.as_os_str().is_empty() => {
            relative.to_string_lossy().into_owned()
        }
        _ => path.to_string_lossy().into_owned(),
    }
}
