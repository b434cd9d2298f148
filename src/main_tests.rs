//! Unit tests for the `pagedrop` CLI binary implementation.

use super::*;
use pagedrop::{RepositoryOutcome, SyncReport};
use rstest::{fixture, rstest};

#[fixture]
fn report() -> DeployReport {
    DeployReport {
        repository_url: String::from("https://github.com/octo/site"),
        pages_url: String::from("https://octo.github.io/site"),
        repository: RepositoryOutcome::Created,
        sync: SyncReport::default(),
        pages: PagesOutcome::Enabled,
    }
}

fn render<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>),
{
    let mut buf = Vec::new();
    write(&mut buf);
    String::from_utf8(buf).expect("utf8")
}

#[test]
fn cli_parses_repeated_routes() {
    let cli = Cli::try_parse_from([
        "pagedrop", "freeze", "--route", "/", "--route", "/success", "--output", "site",
    ])
    .expect("arguments should parse");
    let Command::Freeze(args) = cli.command else {
        panic!("expected freeze command");
    };
    assert_eq!(args.routes, vec!["/", "/success"]);
    assert_eq!(args.output.as_deref(), Some("site"));
}

#[test]
fn cli_accepts_global_verbose_after_subcommand() {
    let cli = Cli::try_parse_from(["pagedrop", "deploy", "--verbose", "--yes"])
        .expect("arguments should parse");
    assert!(cli.verbose);
    assert!(matches!(cli.command, Command::Deploy(DeployArgs { yes: true, .. })));
}

#[test]
fn freeze_routes_default_to_root() {
    assert_eq!(freeze_routes(&FreezeArgs::default()), vec!["/"]);
}

#[test]
fn freeze_overrides_replace_loaded_values() {
    let args = FreezeArgs {
        origin: Some(String::from("http://localhost:8080")),
        output: Some(String::from("dist")),
        companion_script: Some(String::from("static-app.js")),
        no_clean: true,
        ..FreezeArgs::default()
    };
    let config = apply_freeze_overrides(FreezeConfig::default(), &args);
    assert_eq!(config.origin, "http://localhost:8080");
    assert_eq!(config.output_dir, "dist");
    assert_eq!(config.companion_script.as_deref(), Some("static-app.js"));
    assert!(config.data_dir.is_none());
    assert!(!config.cleans_output());
}

#[test]
fn publish_forwards_deploy_flags() {
    let args = PublishArgs {
        yes: true,
        skip_pages: true,
        branch: Some(String::from("gh-pages")),
        ..PublishArgs::default()
    };
    let deploy = args.deploy_args(String::from("build"));
    assert_eq!(deploy.source.as_deref(), Some("build"));
    assert!(deploy.yes);
    assert!(deploy.skip_pages);
    assert_eq!(deploy.branch.as_deref(), Some("gh-pages"));
}

#[tokio::test]
async fn deploy_requires_confirmation() {
    let result = run_deploy(&DeployArgs::default()).await;
    assert!(
        matches!(result, Err(CliError::ConfirmationRequired)),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn publish_requires_confirmation_before_freezing() {
    let result = run_publish(&PublishArgs::default()).await;
    assert!(matches!(result, Err(CliError::ConfirmationRequired)));
}

#[rstest]
fn complete_deploy_exits_zero(report: DeployReport) {
    assert_eq!(deploy_exit_code(&report), 0);
}

#[rstest]
fn pages_failure_is_a_partial_result(report: DeployReport) {
    let partial = DeployReport {
        pages: PagesOutcome::Failed(String::from("status 500: nope")),
        ..report
    };
    assert_eq!(deploy_exit_code(&partial), EXIT_PARTIAL);
}

#[rstest]
fn deploy_summary_lists_counts_and_urls(report: DeployReport) {
    let rendered = render(|buf| write_deploy_summary(buf, &report));
    assert!(rendered.contains("Sync: 0 created, 0 updated, 0 skipped, 0 failed"));
    assert!(rendered.contains("Pages: enabled"));
    assert!(rendered.contains("Site: https://octo.github.io/site"));
}

#[test]
fn freeze_summary_mentions_fallback_index() {
    let report = FreezeReport {
        fallback_index: true,
        ..FreezeReport::default()
    };
    let rendered = render(|buf| write_freeze_summary(buf, &report));
    assert!(rendered.starts_with("Froze 0 page(s)"));
    assert!(rendered.contains("redirect index.html"));
}

#[test]
fn write_error_writes_cli_error() {
    let rendered = render(|buf| write_error(buf, &CliError::ConfirmationRequired));
    assert!(rendered.contains("pass --yes"), "rendered: {rendered}");
}
