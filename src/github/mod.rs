//! GitHub implementation of the content store and Pages host.
//!
//! Objects are addressed through the repository contents API, which stores
//! files by path and requires the current blob SHA to replace one. Repository
//! bootstrap and Pages enablement use their own endpoints.

mod contents;
mod error;
mod repos;
mod types;

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};

use crate::config::GithubConfig;
use crate::store::RemoteTarget;

pub use error::GithubError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("pagedrop/", env!("CARGO_PKG_VERSION"));

/// Client for the GitHub REST API authenticated with a bearer token.
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base.as_str())
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Constructs a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Config`] when the configuration fails
    /// validation or the HTTP client cannot be built, and
    /// [`GithubError::InvalidUrl`] when the API base URL is unusable.
    pub fn new(config: &GithubConfig) -> Result<Self, GithubError> {
        config.validate()?;
        let raw_base = config.api_base.trim();
        let api_base = Url::parse(raw_base).map_err(|err| GithubError::InvalidUrl {
            url: raw_base.to_owned(),
            message: err.to_string(),
        })?;
        if api_base.cannot_be_a_base() {
            return Err(GithubError::InvalidUrl {
                url: raw_base.to_owned(),
                message: String::from("URL cannot carry a path"),
            });
        }

        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| GithubError::Config(err.to_string()))?;

        Ok(Self {
            http,
            api_base,
            token: config.token.trim().to_owned(),
        })
    }

    /// Appends percent-encoded `segments` to the API base URL.
    pub(crate) fn endpoint<'s>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> Result<Url, GithubError> {
        let mut url = self.api_base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| GithubError::InvalidUrl {
                    url: self.api_base.to_string(),
                    message: String::from("URL cannot carry a path"),
                })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// URL of the contents endpoint for `target`.
    pub(crate) fn contents_url(&self, target: &RemoteTarget) -> Result<Url, GithubError> {
        let repository = &target.repository;
        self.endpoint(
            [
                "repos",
                repository.owner.as_str(),
                repository.name.as_str(),
                "contents",
            ]
            .into_iter()
            .chain(target.remote_path.split('/')),
        )
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Sends `builder` and returns the status with the full body text.
    async fn send(
        &self,
        builder: RequestBuilder,
        url: &Url,
    ) -> Result<(StatusCode, String), GithubError> {
        let response = builder
            .send()
            .await
            .map_err(|err| GithubError::transport(url, &err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GithubError::transport(url, &err))?;
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests;
