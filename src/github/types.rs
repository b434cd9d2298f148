//! Wire payloads exchanged with the GitHub REST API.

use serde::{Deserialize, Serialize};

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(super) struct PutContentsBody<'a> {
    pub(super) message: &'a str,
    /// Base64 encoded file content.
    pub(super) content: String,
    pub(super) branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) sha: Option<&'a str>,
}

/// File metadata returned by the contents API.
#[derive(Debug, Deserialize)]
pub(super) struct ContentsEntry {
    pub(super) sha: String,
}

/// Response of a successful contents `PUT`.
#[derive(Debug, Deserialize)]
pub(super) struct PutContentsResponse {
    pub(super) content: Option<ContentsEntry>,
}

/// Body of `POST /user/repos`.
#[derive(Debug, Serialize)]
pub(super) struct CreateRepositoryBody<'a> {
    pub(super) name: &'a str,
    pub(super) description: &'a str,
    pub(super) homepage: &'a str,
    pub(super) private: bool,
    pub(super) has_issues: bool,
    pub(super) has_projects: bool,
    pub(super) has_wiki: bool,
    pub(super) auto_init: bool,
}

/// Subset of the repository representation we care about.
#[derive(Debug, Deserialize)]
pub(super) struct RepositoryResponse {
    pub(super) html_url: Option<String>,
}

/// Body of `POST /repos/{owner}/{repo}/pages`.
#[derive(Debug, Serialize)]
pub(super) struct PagesBody<'a> {
    pub(super) source: PagesSource<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct PagesSource<'a> {
    pub(super) branch: &'a str,
    pub(super) path: &'a str,
}
