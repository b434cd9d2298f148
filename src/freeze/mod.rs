//! Turns a running web application into a static site ready for Pages.
//!
//! The freezer fetches every route it is given, writes the responses under
//! the output directory, and then post-processes the tree: a `.nojekyll`
//! marker, a fallback `index.html`, copied data files, canned API responses,
//! and a companion script referenced from every page.

mod assets;
mod config;
mod source;

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;
use tracing::{debug, info};

use crate::sync::{SyncError, TreeWalker};

pub use assets::{
    COMPANION_SCRIPT_PATH, DATA_DIR, FALLBACK_INDEX, MOCK_API_DIR, NOJEKYLL_FILE,
    companion_script_src, fixture_file_name, inject_script, render_fixture, rewrite_static_urls,
    route_to_file,
};
pub use config::{DEFAULT_ORIGIN, DEFAULT_OUTPUT_DIR, FreezeConfig};
pub use source::{HttpPageSource, PageFuture, PageSource};

/// Errors that abort a freeze.
#[derive(Debug, Error)]
pub enum FreezeError {
    /// Raised when configuration sources cannot be merged.
    #[error("configuration parsing failed: {0}")]
    Config(String),
    /// Raised when a configured value is blank.
    #[error("invalid {field}: set PAGEDROP_FREEZE_{env_suffix} or add {field} to [freeze] in pagedrop.toml", env_suffix = field.to_uppercase())]
    InvalidConfig {
        /// Name of the offending field.
        field: String,
    },
    /// Raised when the origin is not an absolute URL.
    #[error("invalid origin {origin}: {message}")]
    InvalidOrigin {
        /// Origin as configured.
        origin: String,
        /// Why it was rejected.
        message: String,
    },
    /// Raised when a route cannot be mapped to a file.
    #[error("invalid route {route}: {reason}")]
    InvalidRoute {
        /// Route as supplied.
        route: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Raised when a route request produced no response.
    #[error("request for {route} failed: {message}")]
    Request {
        /// Route being fetched.
        route: String,
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when a route answered with a non-success status.
    #[error("route {route} returned status {status}")]
    Fetch {
        /// Route being fetched.
        route: String,
        /// HTTP status code.
        status: u16,
    },
    /// Raised when the output directory is unsafe to clean.
    #[error("refusing to clean output directory {path}: {reason}")]
    UnsafeOutput {
        /// Output directory as configured.
        path: Utf8PathBuf,
        /// Why it was refused.
        reason: String,
    },
    /// Raised when a mock response fixture is malformed.
    #[error("invalid mock response {name}: {reason}")]
    InvalidFixture {
        /// Endpoint name, or the fixture file path.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Raised when reading or writing a local file fails.
    #[error("I/O error at {path}: {message}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Raised when the frozen tree cannot be scanned for pages.
    #[error(transparent)]
    Scan(#[from] SyncError),
}

impl FreezeError {
    fn io(path: &Utf8Path, err: &io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// What a freeze produced.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FreezeReport {
    /// Files written from fetched routes, relative to the output directory.
    pub pages: Vec<Utf8PathBuf>,
    /// Whether the fallback `index.html` was written.
    pub fallback_index: bool,
    /// Data files copied under `data/`.
    pub data_files: Vec<Utf8PathBuf>,
    /// Canned API responses written under `api/`.
    pub fixtures: Vec<Utf8PathBuf>,
    /// Whether the companion script was installed.
    pub companion_script: bool,
    /// HTML files changed by post-processing.
    pub patched: Vec<Utf8PathBuf>,
}

/// Freezes routes served by a [`PageSource`] into a directory.
#[derive(Debug)]
pub struct Freezer<P: PageSource> {
    config: FreezeConfig,
    source: P,
}

impl<P: PageSource> Freezer<P> {
    /// Creates a freezer after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::InvalidConfig`] when a configured value is
    /// blank.
    pub fn new(config: FreezeConfig, source: P) -> Result<Self, FreezeError> {
        config.validate()?;
        Ok(Self { config, source })
    }

    /// Returns a reference to the underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &FreezeConfig {
        &self.config
    }

    /// Fetches `routes` and post-processes the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError`] on the first route that cannot be fetched and
    /// on any local I/O failure. Nothing is rolled back.
    pub async fn freeze<I, R>(&self, routes: I) -> Result<FreezeReport, FreezeError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let output_path = Utf8Path::new(self.config.output_dir.trim());
        let output = prepare_output(output_path, self.config.cleans_output())?;
        let mut report = FreezeReport::default();

        for requested in routes {
            let route = requested.as_ref();
            let file = route_to_file(route)?;
            let body = self.source.fetch(route).await?;
            write_file(&output, output_path, &file, &body)?;
            info!(route, file = %file, "froze route");
            report.pages.push(file);
        }

        write_file(&output, output_path, Utf8Path::new(NOJEKYLL_FILE), b"")?;
        let index = Utf8Path::new("index.html");
        if !exists(&output, output_path, index)? {
            write_file(&output, output_path, index, FALLBACK_INDEX.as_bytes())?;
            info!("no index page produced, wrote fallback redirect");
            report.fallback_index = true;
        }

        if let Some(data_dir) = self.config.data_dir.as_deref() {
            report.data_files = copy_data_files(&output, output_path, Utf8Path::new(data_dir))?;
        }
        if let Some(fixtures) = self.config.mock_responses.as_deref() {
            report.fixtures = write_fixtures(&output, output_path, Utf8Path::new(fixtures))?;
        }
        if let Some(script) = self.config.companion_script.as_deref() {
            let content = read_file(Utf8Path::new(script))?;
            write_file(
                &output,
                output_path,
                Utf8Path::new(COMPANION_SCRIPT_PATH),
                &content,
            )?;
            report.companion_script = true;
        }

        report.patched = patch_pages(&output, output_path, report.companion_script)?;
        Ok(report)
    }
}

fn prepare_output(path: &Utf8Path, clean: bool) -> Result<Dir, FreezeError> {
    if clean && path.is_dir() {
        if path.file_name().is_none() {
            return Err(FreezeError::UnsafeOutput {
                path: path.to_path_buf(),
                reason: String::from("path has no final component"),
            });
        }
        debug!(path = %path, "cleaning output directory");
        Dir::open_ambient_dir(path, ambient_authority())
            .and_then(Dir::remove_open_dir_all)
            .map_err(|err| FreezeError::io(path, &err))?;
    }
    Dir::create_ambient_dir_all(path, ambient_authority())
        .map_err(|err| FreezeError::io(path, &err))?;
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| FreezeError::io(path, &err))
}

fn write_file(
    output: &Dir,
    output_path: &Utf8Path,
    file: &Utf8Path,
    content: &[u8],
) -> Result<(), FreezeError> {
    let full = output_path.join(file);
    if let Some(parent) = file.parent()
        && !parent.as_str().is_empty()
    {
        output
            .create_dir_all(parent)
            .map_err(|err| FreezeError::io(&full, &err))?;
    }
    output
        .write(file, content)
        .map_err(|err| FreezeError::io(&full, &err))
}

fn exists(output: &Dir, output_path: &Utf8Path, file: &Utf8Path) -> Result<bool, FreezeError> {
    output
        .try_exists(file)
        .map_err(|err| FreezeError::io(&output_path.join(file), &err))
}

fn read_file(path: &Utf8Path) -> Result<Vec<u8>, FreezeError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| FreezeError::Io {
        path: path.to_path_buf(),
        message: String::from("path is missing a filename"),
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| FreezeError::io(parent, &err))?;
    dir.read(file_name).map_err(|err| FreezeError::io(path, &err))
}

/// Copies the regular files directly inside `data_dir` to `data/`.
fn copy_data_files(
    output: &Dir,
    output_path: &Utf8Path,
    data_dir: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>, FreezeError> {
    let source = Dir::open_ambient_dir(data_dir, ambient_authority())
        .map_err(|err| FreezeError::io(data_dir, &err))?;
    let mut names = Vec::new();
    for listed in source.entries().map_err(|err| FreezeError::io(data_dir, &err))? {
        let entry = listed.map_err(|err| FreezeError::io(data_dir, &err))?;
        let is_file = entry
            .file_type()
            .map_err(|err| FreezeError::io(data_dir, &err))?
            .is_file();
        if is_file {
            names.push(entry.file_name().map_err(|err| FreezeError::io(data_dir, &err))?);
        }
    }
    names.sort();

    let mut copied = Vec::with_capacity(names.len());
    for name in names {
        let content = source
            .read(&name)
            .map_err(|err| FreezeError::io(&data_dir.join(&name), &err))?;
        let target = Utf8Path::new(DATA_DIR).join(&name);
        write_file(output, output_path, &target, &content)?;
        debug!(file = %target, "copied data file");
        copied.push(target);
    }
    Ok(copied)
}

fn write_fixtures(
    output: &Dir,
    output_path: &Utf8Path,
    fixtures: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>, FreezeError> {
    let raw = read_file(fixtures)?;
    let invalid = |reason: String| FreezeError::InvalidFixture {
        name: fixtures.to_string(),
        reason,
    };
    let value: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|err| invalid(err.to_string()))?;
    let serde_json::Value::Object(responses) = value else {
        return Err(invalid(String::from("expected a JSON object of responses")));
    };

    let mut written = Vec::with_capacity(responses.len());
    for (endpoint, response) in &responses {
        let target = Utf8Path::new(MOCK_API_DIR).join(fixture_file_name(endpoint)?);
        let rendered = render_fixture(response).map_err(|err| FreezeError::InvalidFixture {
            name: endpoint.clone(),
            reason: err.to_string(),
        })?;
        write_file(output, output_path, &target, rendered.as_bytes())?;
        debug!(file = %target, "wrote mock response");
        written.push(target);
    }
    Ok(written)
}

/// Rewrites template leftovers and, when `inject` is set, references the
/// companion script from every HTML page.
fn patch_pages(
    output: &Dir,
    output_path: &Utf8Path,
    inject: bool,
) -> Result<Vec<Utf8PathBuf>, FreezeError> {
    let mut patched = Vec::new();
    for entry in TreeWalker::new(output_path)? {
        let item = entry?;
        let page = item.relative_path();
        if page.extension() != Some("html") {
            continue;
        }

        let original = output
            .read_to_string(page)
            .map_err(|err| FreezeError::io(item.absolute_path(), &err))?;
        let mut html = rewrite_static_urls(&original);
        if inject
            && let Some(with_script) = inject_script(&html, &companion_script_src(page))
        {
            html = with_script;
        }

        if html != original {
            output
                .write(page, html)
                .map_err(|err| FreezeError::io(item.absolute_path(), &err))?;
            patched.push(page.to_path_buf());
        }
    }
    Ok(patched)
}
