//! Command-line interface definitions for the `pagedrop` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `pagedrop` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pagedrop",
    version,
    about = "Freeze a web application into static files and publish them on GitHub Pages",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Log at debug level, overriding `RUST_LOG`.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
    /// Action to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Subcommands accepted by `pagedrop`.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Fetch routes from a running application and write a static site.
    #[command(name = "freeze", about = "Fetch routes and write a static site")]
    Freeze(FreezeArgs),
    /// Upload a directory to GitHub and enable Pages hosting.
    #[command(name = "deploy", about = "Upload a directory and enable GitHub Pages")]
    Deploy(DeployArgs),
    /// Freeze the application, then deploy the result.
    #[command(name = "publish", about = "Freeze, then deploy the frozen site")]
    Publish(PublishArgs),
}

/// Arguments for the `pagedrop freeze` subcommand.
#[derive(Clone, Debug, Default, Args)]
pub(crate) struct FreezeArgs {
    /// Base URL of the running application.
    #[arg(long, value_name = "URL")]
    pub(crate) origin: Option<String>,
    /// Directory the static site is written to.
    #[arg(long, value_name = "DIR")]
    pub(crate) output: Option<String>,
    /// Route to freeze; repeat for several. Defaults to `/`.
    #[arg(long = "route", value_name = "ROUTE")]
    pub(crate) routes: Vec<String>,
    /// Directory whose top-level files are copied to `data/`.
    #[arg(long, value_name = "DIR")]
    pub(crate) data_dir: Option<String>,
    /// Script installed as `static/js/static-app.js` and referenced from
    /// every page.
    #[arg(long, value_name = "PATH")]
    pub(crate) companion_script: Option<String>,
    /// JSON object of canned API responses written under `api/`.
    #[arg(long, value_name = "PATH")]
    pub(crate) mock_responses: Option<String>,
    /// Keep existing files in the output directory.
    #[arg(long)]
    pub(crate) no_clean: bool,
}

/// Arguments for the `pagedrop deploy` subcommand.
#[derive(Clone, Debug, Default, Args)]
pub(crate) struct DeployArgs {
    /// Directory to upload. Defaults to the configured freeze output.
    #[arg(long, value_name = "DIR")]
    pub(crate) source: Option<String>,
    /// Confirm the deployment; nothing is uploaded without it.
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
    /// Upload files without switching on Pages hosting.
    #[arg(long)]
    pub(crate) skip_pages: bool,
    /// Override the target repository name.
    #[arg(long, value_name = "NAME")]
    pub(crate) repository: Option<String>,
    /// Override the branch receiving the files.
    #[arg(long, value_name = "BRANCH")]
    pub(crate) branch: Option<String>,
}

/// Arguments for the `pagedrop publish` subcommand.
#[derive(Clone, Debug, Default, Args)]
pub(crate) struct PublishArgs {
    /// Freeze options.
    #[command(flatten)]
    pub(crate) freeze: FreezeArgs,
    /// Confirm the deployment; nothing is uploaded without it.
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
    /// Upload files without switching on Pages hosting.
    #[arg(long)]
    pub(crate) skip_pages: bool,
    /// Override the target repository name.
    #[arg(long, value_name = "NAME")]
    pub(crate) repository: Option<String>,
    /// Override the branch receiving the files.
    #[arg(long, value_name = "BRANCH")]
    pub(crate) branch: Option<String>,
}

impl PublishArgs {
    /// Deploy options implied by a publish, uploading the frozen output.
    pub(crate) fn deploy_args(&self, source: String) -> DeployArgs {
        DeployArgs {
            source: Some(source),
            yes: self.yes,
            skip_pages: self.skip_pages,
            repository: self.repository.clone(),
            branch: self.branch.clone(),
        }
    }
}
