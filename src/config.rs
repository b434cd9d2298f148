//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::store::RepositoryId;

/// Default REST endpoint for GitHub.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository name used when none is configured.
pub const DEFAULT_REPOSITORY: &str = "static-site";

/// GitHub credentials and repository settings derived from environment
/// variables and configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PAGEDROP_GITHUB",
    discovery(
        app_name = "pagedrop",
        env_var = "PAGEDROP_CONFIG_PATH",
        config_file_name = "pagedrop.toml",
        dotfile_name = ".pagedrop.toml",
        project_file_name = "pagedrop.toml"
    )
)]
pub struct GithubConfig {
    /// Personal access token used as a bearer credential. Required.
    pub token: String,
    /// Account that owns the target repository. Required.
    pub owner: String,
    /// Repository receiving the frozen site.
    #[ortho_config(default = DEFAULT_REPOSITORY.to_owned())]
    pub repository: String,
    /// Description set when the repository is created.
    #[ortho_config(default = "Static site published by pagedrop".to_owned())]
    pub description: String,
    /// Whether a newly created repository is private.
    #[ortho_config(default = false)]
    pub private: bool,
    /// Base URL of the REST API; override for GitHub Enterprise.
    #[ortho_config(default = DEFAULT_API_BASE.to_owned())]
    pub api_base: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl GithubConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to [github] in pagedrop.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("pagedrop")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the configured repository identifier.
    #[must_use]
    pub fn repository_id(&self) -> RepositoryId {
        RepositoryId::new(&self.owner, &self.repository)
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.token,
            &FieldMetadata::new("GitHub access token", "PAGEDROP_GITHUB_TOKEN", "token"),
        )?;
        Self::require_field(
            &self.owner,
            &FieldMetadata::new("repository owner", "PAGEDROP_GITHUB_OWNER", "owner"),
        )?;
        Self::require_field(
            &self.repository,
            &FieldMetadata::new("repository name", "PAGEDROP_GITHUB_REPOSITORY", "repository"),
        )?;
        Self::require_field(
            &self.api_base,
            &FieldMetadata::new("API base URL", "PAGEDROP_GITHUB_API_BASE", "api_base"),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
