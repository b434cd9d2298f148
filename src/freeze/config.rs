//! Freeze settings loaded via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::FreezeError;

/// Origin fetched when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000";

/// Directory receiving the frozen site when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Where the running application lives and what to do with its output.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PAGEDROP_FREEZE",
    discovery(
        app_name = "pagedrop",
        env_var = "PAGEDROP_CONFIG_PATH",
        config_file_name = "pagedrop.toml",
        dotfile_name = ".pagedrop.toml",
        project_file_name = "pagedrop.toml"
    )
)]
pub struct FreezeConfig {
    /// Base URL of the running application.
    #[ortho_config(default = DEFAULT_ORIGIN.to_owned())]
    pub origin: String,
    /// Directory the static site is written to.
    #[ortho_config(default = DEFAULT_OUTPUT_DIR.to_owned())]
    pub output_dir: String,
    /// Directory whose top-level files are copied to `data/`.
    pub data_dir: Option<String>,
    /// Script copied to `static/js/static-app.js` and referenced from every
    /// page, standing in for server-side form handling.
    pub companion_script: Option<String>,
    /// JSON object mapping endpoint names to canned responses written under
    /// `api/`.
    pub mock_responses: Option<String>,
    /// Whether the output directory is emptied before freezing. Unset means
    /// yes; see [`FreezeConfig::cleans_output`].
    pub clean_output: Option<bool>,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_owned(),
            output_dir: DEFAULT_OUTPUT_DIR.to_owned(),
            data_dir: None,
            companion_script: None,
            mock_responses: None,
            clean_output: None,
        }
    }
}

impl FreezeConfig {
    /// Loads configuration from defaults, configuration files, and
    /// environment variables, ignoring the process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::Config`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, FreezeError> {
        Self::load_from_iter([std::ffi::OsString::from("pagedrop")])
            .map_err(|err| FreezeError::Config(err.to_string()))
    }

    /// Whether the output directory is emptied before freezing, defaulting
    /// to `true` when no layer sets `clean_output`.
    #[must_use]
    pub const fn cleans_output(&self) -> bool {
        match self.clean_output {
            Some(clean) => clean,
            None => true,
        }
    }

    /// Ensures required values are present and optional ones are not blank.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), FreezeError> {
        Self::require_value(Some(&self.origin), "origin")?;
        Self::require_value(Some(&self.output_dir), "output_dir")?;
        Self::require_value(self.data_dir.as_ref(), "data_dir")?;
        Self::require_value(self.companion_script.as_ref(), "companion_script")?;
        Self::require_value(self.mock_responses.as_ref(), "mock_responses")?;
        Ok(())
    }

    fn require_value(value: Option<&String>, field: &str) -> Result<(), FreezeError> {
        if value.is_some_and(|v| v.trim().is_empty()) {
            return Err(FreezeError::InvalidConfig {
                field: field.to_owned(),
            });
        }
        Ok(())
    }
}
