//! Mapping of local relative paths onto the remote addressing scheme.

use camino::{Utf8Component, Utf8Path};

use super::SyncError;

/// File name of the zero-byte object that stands in for a directory.
pub const PLACEHOLDER_FILE_NAME: &str = ".gitkeep";

/// Remote location of a file plus the directories that must precede it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPath {
    /// Forward-slash separated path relative to the repository root.
    pub remote_path: String,
    /// Ancestor directory prefixes, root-most first.
    pub ancestors: Vec<String>,
}

/// Resolves `relative` into its remote path and ancestor prefixes.
///
/// Host separators are normalised to `/` and `.` components are dropped.
///
/// # Errors
///
/// Returns [`SyncError::InvalidPath`] for empty paths and for paths that are
/// absolute or climb out of the sync root.
///
/// # Examples
///
/// ```
/// # use camino::Utf8Path;
/// # use pagedrop::sync::resolve_remote_path;
/// let resolved = resolve_remote_path(Utf8Path::new("static/js/app.js")).expect("valid path");
/// assert_eq!(resolved.remote_path, "static/js/app.js");
/// assert_eq!(resolved.ancestors, vec!["static", "static/js"]);
/// ```
pub fn resolve_remote_path(relative: &Utf8Path) -> Result<ResolvedPath, SyncError> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Utf8Component::Normal(segment) => segments.push(segment),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(invalid(relative, "path must stay inside the sync root"));
            }
        }
    }

    let Some((_, directories)) = segments.split_last() else {
        return Err(invalid(relative, "path is empty"));
    };

    let mut ancestors = Vec::with_capacity(directories.len());
    let mut prefix = String::new();
    for directory in directories {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(directory);
        ancestors.push(prefix.clone());
    }

    Ok(ResolvedPath {
        remote_path: segments.join("/"),
        ancestors,
    })
}

/// Remote path of the placeholder object for a directory prefix.
#[must_use]
pub fn placeholder_path(prefix: &str) -> String {
    format!("{prefix}/{PLACEHOLDER_FILE_NAME}")
}

fn invalid(relative: &Utf8Path, reason: &str) -> SyncError {
    SyncError::InvalidPath {
        path: relative.to_string(),
        reason: reason.to_owned(),
    }
}
