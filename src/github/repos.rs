//! Repository bootstrap and Pages enablement.

use reqwest::{Method, StatusCode};

use super::types::{CreateRepositoryBody, PagesBody, PagesSource, RepositoryResponse};
use super::{GithubClient, GithubError};
use crate::store::{PagesHost, PagesStatus, RepositoryId, RepositorySpec, RepositoryStatus, StoreFuture};

impl PagesHost for GithubClient {
    type Error = GithubError;

    /// Creates the repository under the authenticated user.
    fn create_repository<'a>(
        &'a self,
        spec: &'a RepositorySpec,
    ) -> StoreFuture<'a, RepositoryStatus, Self::Error> {
        Box::pin(async move {
            let url = self.endpoint(["user", "repos"])?;
            let payload = CreateRepositoryBody {
                name: &spec.repository.name,
                description: &spec.description,
                homepage: &spec.homepage,
                private: spec.private,
                has_issues: true,
                has_projects: false,
                has_wiki: false,
                auto_init: false,
            };
            let builder = self.request(Method::POST, url.clone()).json(&payload);
            let (status, body) = self.send(builder, &url).await?;
            Ok(classify_repository(status, &body))
        })
    }

    fn enable_pages<'a>(
        &'a self,
        repository: &'a RepositoryId,
        branch: &'a str,
    ) -> StoreFuture<'a, PagesStatus, Self::Error> {
        Box::pin(async move {
            let url = self.endpoint([
                "repos",
                repository.owner.as_str(),
                repository.name.as_str(),
                "pages",
            ])?;
            let payload = PagesBody {
                source: PagesSource { branch, path: "/" },
            };
            let builder = self.request(Method::POST, url.clone()).json(&payload);
            let (status, body) = self.send(builder, &url).await?;
            Ok(classify_pages(status, &body))
        })
    }
}

/// 422 means the name is taken, which for a redeploy is the normal case.
pub(super) fn classify_repository(status: StatusCode, body: &str) -> RepositoryStatus {
    match status {
        StatusCode::CREATED => RepositoryStatus::Created {
            html_url: serde_json::from_str::<RepositoryResponse>(body)
                .ok()
                .and_then(|response| response.html_url),
        },
        StatusCode::UNPROCESSABLE_ENTITY => RepositoryStatus::AlreadyExists,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepositoryStatus::Unauthorized {
            status: status.as_u16(),
            body: body.to_owned(),
        },
        other => RepositoryStatus::Rejected {
            status: other.as_u16(),
            body: body.to_owned(),
        },
    }
}

pub(super) fn classify_pages(status: StatusCode, body: &str) -> PagesStatus {
    match status {
        StatusCode::CREATED | StatusCode::NO_CONTENT => PagesStatus::Enabled,
        StatusCode::CONFLICT => PagesStatus::AlreadyEnabled,
        other => PagesStatus::Rejected {
            status: other.as_u16(),
            body: body.to_owned(),
        },
    }
}
