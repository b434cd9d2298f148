//! Synchronisation configuration structures and validation.
//!
//! This module defines [`SyncConfig`] for the bulk upload settings, along
//! with the associated error type. Configuration is loaded via `ortho-config`
//! which merges defaults, configuration files, and environment variables.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Branch written to when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Files larger than this are skipped (50 MiB).
pub const DEFAULT_SIZE_CEILING_BYTES: u64 = 50 * 1024 * 1024;

/// Pause between consecutive items, in milliseconds.
pub const DEFAULT_PACING_DELAY_MS: u64 = 500;

/// Bulk upload settings loaded via `ortho-config`.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PAGEDROP_SYNC",
    discovery(
        app_name = "pagedrop",
        env_var = "PAGEDROP_CONFIG_PATH",
        config_file_name = "pagedrop.toml",
        dotfile_name = ".pagedrop.toml",
        project_file_name = "pagedrop.toml"
    )
)]
pub struct SyncConfig {
    /// Branch that receives every upload.
    #[ortho_config(default = DEFAULT_BRANCH.to_owned())]
    pub branch: String,
    /// Largest file, in bytes, that is uploaded; bigger files are skipped.
    #[ortho_config(default = DEFAULT_SIZE_CEILING_BYTES)]
    pub size_ceiling_bytes: u64,
    /// Pause after each item, in milliseconds, to stay under rate limits.
    #[ortho_config(default = DEFAULT_PACING_DELAY_MS)]
    pub pacing_delay_ms: u64,
}

/// Errors raised when loading the sync configuration from layered sources.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SyncConfigLoadError {
    /// Indicates that parsing or merging configuration layers failed.
    #[error("sync configuration parsing failed: {0}")]
    Parse(String),
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_owned(),
            size_ceiling_bytes: DEFAULT_SIZE_CEILING_BYTES,
            pacing_delay_ms: DEFAULT_PACING_DELAY_MS,
        }
    }
}

impl SyncConfig {
    /// Ensures configuration values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] when the branch is blank or the
    /// size ceiling is zero.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.branch.trim().is_empty() {
            return Err(SyncError::InvalidConfig {
                field: String::from("branch"),
            });
        }
        if self.size_ceiling_bytes == 0 {
            return Err(SyncError::InvalidConfig {
                field: String::from("size_ceiling_bytes"),
            });
        }
        Ok(())
    }

    /// Loads configuration using defaults, configuration files, and
    /// environment variables, ignoring the process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`SyncConfigLoadError::Parse`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, SyncConfigLoadError> {
        Self::load_from_iter([std::ffi::OsString::from("pagedrop")])
            .map_err(|err| SyncConfigLoadError::Parse(err.to_string()))
    }

    /// Pause applied after every item.
    #[must_use]
    pub const fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

/// Errors surfaced while walking the local tree or running a sync.
///
/// Only [`SyncError::InvalidConfig`] and [`SyncError::MissingSource`] abort a
/// run; the other variants are recorded against the item that raised them.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SyncError {
    /// Raised when configuration holds an unusable value. The error message
    /// includes guidance on how to provide the value via environment variable
    /// or configuration file.
    #[error("invalid {field}: set PAGEDROP_SYNC_{env_suffix} or add {field} to [sync] in pagedrop.toml", env_suffix = field.to_uppercase())]
    InvalidConfig {
        /// Configuration field that failed validation.
        field: String,
    },
    /// Raised when the source directory does not exist.
    #[error("sync source directory missing: {path}")]
    MissingSource {
        /// Path that was expected to be synchronised.
        path: Utf8PathBuf,
    },
    /// Raised when the directory walk cannot read an entry.
    #[error("failed to walk {path}: {message}")]
    Walk {
        /// Entry that could not be read.
        path: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when a local path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },
    /// Raised when a relative path cannot be mapped to a remote path.
    #[error("cannot map {path} to a remote path: {reason}")]
    InvalidPath {
        /// Relative path that was rejected.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },
    /// Raised when a file cannot be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
}

impl SyncError {
    /// Path the error refers to, rendered for reporting.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::InvalidConfig { field } => field.clone(),
            Self::MissingSource { path } | Self::Read { path, .. } => path.to_string(),
            Self::Walk { path, .. } | Self::NonUtf8Path { path } | Self::InvalidPath { path, .. } => {
                path.clone()
            }
        }
    }
}
