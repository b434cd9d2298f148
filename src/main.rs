//! Binary entry point for the pagedrop CLI.

mod cli;

use std::io::{self, Write};
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pagedrop::{
    DeployError, DeployOrchestrator, DeployReport, DeployRequest, FreezeConfig, FreezeError,
    FreezeReport, Freezer, GithubClient, GithubConfig, GithubError, HttpPageSource, PagesOutcome,
    SyncConfig, SyncError, Syncer,
};

use cli::{Cli, Command, DeployArgs, FreezeArgs, PublishArgs};

/// Exit status for a deployment that finished with per-file or Pages
/// failures.
const EXIT_PARTIAL: i32 = 2;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("freeze failed: {0}")]
    Freeze(#[from] FreezeError),
    #[error("GitHub client error: {0}")]
    Github(#[from] GithubError),
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("deploy failed: {0}")]
    Deploy(#[from] DeployError<GithubError>),
    #[error("refusing to deploy without confirmation: pass --yes")]
    ConfirmationRequired,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match dispatch(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(command: Command) -> Result<i32, CliError> {
    match command {
        Command::Freeze(args) => {
            let report = run_freeze(&args).await?;
            write_freeze_summary(io::stdout(), &report);
            Ok(0)
        }
        Command::Deploy(args) => {
            let report = run_deploy(&args).await?;
            write_deploy_summary(io::stdout(), &report);
            Ok(deploy_exit_code(&report))
        }
        Command::Publish(args) => run_publish(&args).await,
    }
}

async fn run_publish(args: &PublishArgs) -> Result<i32, CliError> {
    require_confirmation(args.yes)?;
    let report = run_freeze(&args.freeze).await?;
    write_freeze_summary(io::stdout(), &report);

    let config = freeze_config(&args.freeze)?;
    let deploy = run_deploy(&args.deploy_args(config.output_dir)).await?;
    write_deploy_summary(io::stdout(), &deploy);
    Ok(deploy_exit_code(&deploy))
}

async fn run_freeze(args: &FreezeArgs) -> Result<FreezeReport, CliError> {
    let config = freeze_config(args)?;
    let source = HttpPageSource::new(&config.origin)?;
    let freezer = Freezer::new(config, source)?;
    let routes = freeze_routes(args);
    Ok(freezer.freeze(&routes).await?)
}

fn freeze_config(args: &FreezeArgs) -> Result<FreezeConfig, CliError> {
    let loaded = FreezeConfig::load_without_cli_args()?;
    Ok(apply_freeze_overrides(loaded, args))
}

fn apply_freeze_overrides(mut config: FreezeConfig, args: &FreezeArgs) -> FreezeConfig {
    if let Some(origin) = &args.origin {
        config.origin.clone_from(origin);
    }
    if let Some(output) = &args.output {
        config.output_dir.clone_from(output);
    }
    if args.data_dir.is_some() {
        config.data_dir.clone_from(&args.data_dir);
    }
    if args.companion_script.is_some() {
        config.companion_script.clone_from(&args.companion_script);
    }
    if args.mock_responses.is_some() {
        config.mock_responses.clone_from(&args.mock_responses);
    }
    if args.no_clean {
        config.clean_output = Some(false);
    }
    config
}

fn freeze_routes(args: &FreezeArgs) -> Vec<String> {
    if args.routes.is_empty() {
        vec![String::from("/")]
    } else {
        args.routes.clone()
    }
}

async fn run_deploy(args: &DeployArgs) -> Result<DeployReport, CliError> {
    require_confirmation(args.yes)?;

    let mut github_config =
        GithubConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    if let Some(repository) = &args.repository {
        github_config.repository.clone_from(repository);
    }
    let mut sync_config =
        SyncConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    if let Some(branch) = &args.branch {
        sync_config.branch.clone_from(branch);
    }
    let source = match &args.source {
        Some(source) => Utf8PathBuf::from(source),
        None => Utf8PathBuf::from(FreezeConfig::load_without_cli_args()?.output_dir),
    };

    let client = GithubClient::new(&github_config)?;
    let syncer = Syncer::new(sync_config, github_config.repository_id(), client.clone())?;
    let orchestrator = DeployOrchestrator::new(client, syncer);
    let request = DeployRequest {
        description: github_config.description.clone(),
        private: github_config.private,
        enable_pages: !args.skip_pages,
    };

    Ok(orchestrator.execute(&request, &source).await?)
}

const fn require_confirmation(confirmed: bool) -> Result<(), CliError> {
    if confirmed {
        Ok(())
    } else {
        Err(CliError::ConfirmationRequired)
    }
}

fn deploy_exit_code(report: &DeployReport) -> i32 {
    if report.is_complete() { 0 } else { EXIT_PARTIAL }
}

fn write_freeze_summary(mut target: impl Write, report: &FreezeReport) {
    writeln!(
        target,
        "Froze {} page(s), {} data file(s), {} mock response(s); patched {} page(s)",
        report.pages.len(),
        report.data_files.len(),
        report.fixtures.len(),
        report.patched.len()
    )
    .ok();
    if report.fallback_index {
        writeln!(target, "No index page was produced; wrote a redirect index.html").ok();
    }
}

fn write_deploy_summary(mut target: impl Write, report: &DeployReport) {
    writeln!(target, "Sync: {}", report.sync).ok();
    for failure in report.sync.failures() {
        writeln!(
            target,
            "  failed: {} ({})",
            failure.relative_path,
            failure.error_detail.as_deref().unwrap_or("no detail")
        )
        .ok();
    }
    writeln!(target, "Pages: {}", pages_label(report)).ok();
    writeln!(target, "Repository: {}", report.repository_url).ok();
    writeln!(target, "Site: {}", report.pages_url).ok();
}

fn pages_label(report: &DeployReport) -> String {
    match &report.pages {
        PagesOutcome::Skipped => String::from("skipped"),
        PagesOutcome::Enabled => String::from("enabled"),
        PagesOutcome::AlreadyEnabled => String::from("already enabled"),
        PagesOutcome::Failed(detail) => format!("failed ({detail})"),
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
