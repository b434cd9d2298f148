//! Unit tests for URL construction and response classification.

use reqwest::StatusCode;
use rstest::{fixture, rstest};

use super::contents::{classify_probe, classify_upsert};
use super::repos::{classify_pages, classify_repository};
use super::{GithubClient, GithubError};
use crate::config::GithubConfig;
use crate::store::{
    PagesStatus, ProbeOutcome, RemoteTarget, RepositoryId, RepositoryStatus, RevisionMarker,
    UpsertOutcome,
};

#[fixture]
fn config() -> GithubConfig {
    GithubConfig {
        token: String::from("ghp_example"),
        owner: String::from("octocat"),
        repository: String::from("site"),
        description: String::from("test site"),
        private: false,
        api_base: String::from("https://api.github.com"),
    }
}

fn target(path: &str) -> RemoteTarget {
    RemoteTarget {
        repository: RepositoryId::new("octocat", "site"),
        remote_path: path.to_owned(),
        branch: String::from("main"),
    }
}

#[rstest]
fn contents_url_keeps_nested_segments(config: GithubConfig) {
    let client = GithubClient::new(&config).expect("client should build");
    let url = client
        .contents_url(&target("static/js/app.js"))
        .expect("url should build");

    assert_eq!(
        url.as_str(),
        "https://api.github.com/repos/octocat/site/contents/static/js/app.js"
    );
}

#[rstest]
fn contents_url_percent_encodes_segments(config: GithubConfig) {
    let client = GithubClient::new(&config).expect("client should build");
    let url = client
        .contents_url(&target("docs/read me.html"))
        .expect("url should build");

    assert_eq!(
        url.as_str(),
        "https://api.github.com/repos/octocat/site/contents/docs/read%20me.html"
    );
}

#[rstest]
fn endpoint_tolerates_base_with_path_and_trailing_slash(config: GithubConfig) {
    let cfg = GithubConfig {
        api_base: String::from("https://ghe.example.com/api/v3/"),
        ..config
    };
    let client = GithubClient::new(&cfg).expect("client should build");
    let url = client.endpoint(["user", "repos"]).expect("url should build");

    assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/user/repos");
}

#[rstest]
fn new_rejects_unparseable_base(config: GithubConfig) {
    let cfg = GithubConfig {
        api_base: String::from("not a url"),
        ..config
    };
    let err = GithubClient::new(&cfg).expect_err("base should be rejected");

    assert!(
        matches!(err, GithubError::InvalidUrl { .. }),
        "unexpected error: {err}"
    );
}

#[rstest]
fn new_rejects_blank_token(config: GithubConfig) {
    let cfg = GithubConfig {
        token: String::from("   "),
        ..config
    };
    let err = GithubClient::new(&cfg).expect_err("blank token should be rejected");

    assert!(
        matches!(err, GithubError::Config(ref message) if message.contains("PAGEDROP_GITHUB_TOKEN")),
        "unexpected error: {err}"
    );
}

#[rstest]
fn debug_output_redacts_token(config: GithubConfig) {
    let client = GithubClient::new(&config).expect("client should build");
    let rendered = format!("{client:?}");

    assert!(!rendered.contains("ghp_example"), "token leaked: {rendered}");
}

#[test]
fn probe_of_file_returns_revision() {
    let outcome = classify_probe(StatusCode::OK, r#"{"type":"file","sha":"abc123","path":"a"}"#);

    assert_eq!(
        outcome,
        ProbeOutcome::Present {
            revision: Some(RevisionMarker::new("abc123")),
        }
    );
}

#[test]
fn probe_of_directory_is_present_without_revision() {
    let outcome = classify_probe(StatusCode::OK, r#"[{"type":"file","sha":"abc123"}]"#);

    assert_eq!(outcome, ProbeOutcome::Present { revision: None });
}

#[test]
fn probe_not_found_is_absent() {
    assert_eq!(
        classify_probe(StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#),
        ProbeOutcome::Absent
    );
}

#[rstest]
#[case(StatusCode::UNAUTHORIZED)]
#[case(StatusCode::FORBIDDEN)]
#[case(StatusCode::INTERNAL_SERVER_ERROR)]
fn probe_other_status_is_unexpected(#[case] status: StatusCode) {
    let outcome = classify_probe(status, "boom");

    assert_eq!(
        outcome,
        ProbeOutcome::Unexpected {
            status: status.as_u16(),
            body: String::from("boom"),
        }
    );
}

#[rstest]
#[case(StatusCode::OK)]
#[case(StatusCode::CREATED)]
fn upsert_success_reports_new_revision(#[case] status: StatusCode) {
    let outcome = classify_upsert(status, r#"{"content":{"sha":"def456"},"commit":{}}"#);

    assert_eq!(
        outcome,
        UpsertOutcome::Written {
            revision: Some(RevisionMarker::new("def456")),
        }
    );
}

#[test]
fn upsert_conflict_is_rejected_with_body() {
    let outcome = classify_upsert(StatusCode::CONFLICT, "sha mismatch");

    assert_eq!(
        outcome,
        UpsertOutcome::Rejected {
            status: 409,
            body: String::from("sha mismatch"),
        }
    );
}

#[test]
fn repository_created_reports_html_url() {
    let outcome = classify_repository(
        StatusCode::CREATED,
        r#"{"html_url":"https://github.com/octocat/site"}"#,
    );

    assert_eq!(
        outcome,
        RepositoryStatus::Created {
            html_url: Some(String::from("https://github.com/octocat/site")),
        }
    );
}

#[test]
fn repository_unprocessable_means_already_exists() {
    assert_eq!(
        classify_repository(StatusCode::UNPROCESSABLE_ENTITY, "name already exists"),
        RepositoryStatus::AlreadyExists
    );
}

#[rstest]
#[case(StatusCode::UNAUTHORIZED)]
#[case(StatusCode::FORBIDDEN)]
fn repository_auth_failures_are_unauthorized(#[case] status: StatusCode) {
    let outcome = classify_repository(status, "Bad credentials");

    assert!(
        matches!(outcome, RepositoryStatus::Unauthorized { status: code, .. } if code == status.as_u16()),
        "unexpected outcome: {outcome:?}"
    );
}

#[test]
fn repository_server_error_is_rejected() {
    assert!(matches!(
        classify_repository(StatusCode::BAD_GATEWAY, "oops"),
        RepositoryStatus::Rejected { status: 502, .. }
    ));
}

#[rstest]
#[case(StatusCode::CREATED, PagesStatus::Enabled)]
#[case(StatusCode::NO_CONTENT, PagesStatus::Enabled)]
#[case(StatusCode::CONFLICT, PagesStatus::AlreadyEnabled)]
fn pages_statuses_are_classified(#[case] status: StatusCode, #[case] expected: PagesStatus) {
    assert_eq!(classify_pages(status, ""), expected);
}

#[test]
fn pages_other_status_is_rejected() {
    assert_eq!(
        classify_pages(StatusCode::UNPROCESSABLE_ENTITY, "branch missing"),
        PagesStatus::Rejected {
            status: 422,
            body: String::from("branch missing"),
        }
    );
}
