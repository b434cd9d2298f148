//! Error types for the GitHub client.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the GitHub client before or while talking to the API.
///
/// HTTP status codes are not errors at this layer; they are classified into
/// the outcome types of [`crate::store`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GithubError {
    /// Raised when the high-level configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when an endpoint URL cannot be built.
    #[error("invalid API URL {url}: {message}")]
    InvalidUrl {
        /// URL, or base URL, that was rejected.
        url: String,
        /// Why the URL was rejected.
        message: String,
    },
    /// Raised when the request never produced an HTTP response.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Endpoint that was being called.
        url: String,
        /// Message returned by the HTTP client.
        message: String,
    },
}

impl GithubError {
    pub(super) fn transport(url: &reqwest::Url, err: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for GithubError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
