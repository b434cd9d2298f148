//! Unit tests for configuration loading and validation.

use pagedrop::config::{ConfigError, DEFAULT_API_BASE, DEFAULT_REPOSITORY};
use pagedrop::freeze::{DEFAULT_ORIGIN, DEFAULT_OUTPUT_DIR};
use pagedrop::sync::{DEFAULT_BRANCH, DEFAULT_PACING_DELAY_MS, DEFAULT_SIZE_CEILING_BYTES};
use pagedrop::test_support::EnvGuard;
use pagedrop::{FreezeConfig, GithubClient, GithubConfig, SyncConfig};
use rstest::*;
use tempfile::TempDir;

#[fixture]
fn valid_config() -> GithubConfig {
    GithubConfig {
        token: String::from("ghp_example"),
        owner: String::from("octo"),
        repository: String::from(DEFAULT_REPOSITORY),
        description: String::from("Static site"),
        private: false,
        api_base: String::from(DEFAULT_API_BASE),
    }
}

/// Environment shared by loader tests: isolated home and config discovery.
async fn isolated_env(home: &TempDir, pairs: &[(&str, &str)]) -> EnvGuard {
    let home_path = home.path().to_string_lossy().into_owned();
    let mut vars = vec![("HOME", home_path.as_str()), ("XDG_CONFIG_HOME", home_path.as_str())];
    vars.extend_from_slice(pairs);
    EnvGuard::apply(
        &vars,
        &[
            "PAGEDROP_CONFIG_PATH",
            "PAGEDROP_GITHUB_REPOSITORY",
            "PAGEDROP_GITHUB_API_BASE",
            "PAGEDROP_SYNC_BRANCH",
            "PAGEDROP_FREEZE_ORIGIN",
            "PAGEDROP_FREEZE_OUTPUT_DIR",
        ],
    )
    .await
}

#[test]
fn config_validation_accepts_complete_config() {
    assert!(valid_config().validate().is_ok());
}

/// Verifies that validation produces actionable errors mentioning the
/// environment variable, the configuration file and the TOML key.
#[rstest]
#[case::token(|cfg: &mut GithubConfig| cfg.token.clear(), "PAGEDROP_GITHUB_TOKEN", "token")]
#[case::owner(|cfg: &mut GithubConfig| cfg.owner = String::from("  "), "PAGEDROP_GITHUB_OWNER", "owner")]
#[case::repository(|cfg: &mut GithubConfig| cfg.repository.clear(), "PAGEDROP_GITHUB_REPOSITORY", "repository")]
#[case::api_base(|cfg: &mut GithubConfig| cfg.api_base.clear(), "PAGEDROP_GITHUB_API_BASE", "api_base")]
fn config_validation_produces_actionable_errors(
    #[case] mutate: fn(&mut GithubConfig),
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    let mut cfg = valid_config();
    mutate(&mut cfg);

    let error = cfg.validate().expect_err("validation should fail");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error");
    };
    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains("pagedrop.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[test]
fn repository_id_trims_configured_values() {
    let cfg = GithubConfig {
        owner: String::from(" octo "),
        repository: String::from("site\n"),
        ..valid_config()
    };
    let id = cfg.repository_id();
    assert_eq!(id.to_string(), "octo/site");
    assert_eq!(id.pages_url(), "https://octo.github.io/site");
}

#[test]
fn client_rejects_invalid_config() {
    let cfg = GithubConfig {
        token: String::new(),
        ..valid_config()
    };
    let err = GithubClient::new(&cfg).expect_err("blank token should fail");
    assert!(err.to_string().contains("PAGEDROP_GITHUB_TOKEN"), "got {err}");
}

#[tokio::test]
async fn github_config_loads_from_environment_with_defaults() {
    let home = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let _guard = isolated_env(
        &home,
        &[
            ("PAGEDROP_GITHUB_TOKEN", "ghp_from_env"),
            ("PAGEDROP_GITHUB_OWNER", "octo"),
        ],
    )
    .await;

    let cfg = GithubConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));

    assert_eq!(cfg.token, "ghp_from_env");
    assert_eq!(cfg.owner, "octo");
    assert_eq!(cfg.repository, DEFAULT_REPOSITORY);
    assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    assert!(!cfg.private);
}

#[tokio::test]
async fn sync_config_reads_overrides_from_environment() {
    let home = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let _guard = isolated_env(
        &home,
        &[
            ("PAGEDROP_SYNC_PACING_DELAY_MS", "0"),
            ("PAGEDROP_SYNC_SIZE_CEILING_BYTES", "1000"),
        ],
    )
    .await;

    let cfg = SyncConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("sync config should load: {err}"));

    assert_eq!(cfg.branch, DEFAULT_BRANCH);
    assert_eq!(cfg.pacing_delay_ms, 0);
    assert_eq!(cfg.size_ceiling_bytes, 1000);
}

#[test]
fn sync_config_defaults_match_documented_values() {
    let cfg = SyncConfig::default();
    assert_eq!(cfg.branch, DEFAULT_BRANCH);
    assert_eq!(cfg.size_ceiling_bytes, DEFAULT_SIZE_CEILING_BYTES);
    assert_eq!(cfg.pacing_delay_ms, DEFAULT_PACING_DELAY_MS);
    assert_eq!(DEFAULT_SIZE_CEILING_BYTES, 52_428_800);
}

#[tokio::test]
async fn freeze_config_loads_defaults() {
    let home = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let _guard = isolated_env(&home, &[]).await;

    let cfg = FreezeConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("freeze config should load: {err}"));

    assert_eq!(cfg.origin, DEFAULT_ORIGIN);
    assert_eq!(cfg.output_dir, DEFAULT_OUTPUT_DIR);
    assert!(cfg.cleans_output());
    assert!(cfg.clean_output.is_none());
    assert!(cfg.companion_script.is_none());
}
