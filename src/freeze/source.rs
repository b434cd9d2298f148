//! Where frozen pages come from.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::FreezeError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Future returned by [`PageSource::fetch`].
pub type PageFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, FreezeError>> + Send + 'a>>;

/// Renders a route of the running application.
pub trait PageSource {
    /// Fetches the body served for `route`.
    fn fetch<'a>(&'a self, route: &'a str) -> PageFuture<'a>;
}

/// Fetches routes from an application listening over HTTP.
#[derive(Clone, Debug)]
pub struct HttpPageSource {
    http: Client,
    origin: Url,
}

impl HttpPageSource {
    /// Targets the application served at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::InvalidOrigin`] when `origin` is not an
    /// absolute URL and [`FreezeError::Config`] when the HTTP client cannot
    /// be built.
    pub fn new(origin: &str) -> Result<Self, FreezeError> {
        let raw = origin.trim();
        let mut base = Url::parse(raw).map_err(|err| FreezeError::InvalidOrigin {
            origin: raw.to_owned(),
            message: err.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FreezeError::InvalidOrigin {
                origin: raw.to_owned(),
                message: String::from("URL cannot carry a path"),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|err| FreezeError::Config(err.to_string()))?;
        Ok(Self { http, origin: base })
    }

    /// Absolute URL served for `route`.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::InvalidRoute`] when the route cannot be joined
    /// onto the origin.
    pub fn url_for(&self, route: &str) -> Result<Url, FreezeError> {
        self.origin
            .join(route.trim_start_matches('/'))
            .map_err(|err| FreezeError::InvalidRoute {
                route: route.to_owned(),
                reason: err.to_string(),
            })
    }
}

impl PageSource for HttpPageSource {
    fn fetch<'a>(&'a self, route: &'a str) -> PageFuture<'a> {
        Box::pin(async move {
            let url = self.url_for(route)?;
            debug!(url = %url, "fetching route");
            let request_error = |err: reqwest::Error| FreezeError::Request {
                route: route.to_owned(),
                message: err.to_string(),
            };
            let response = self.http.get(url).send().await.map_err(request_error)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FreezeError::Fetch {
                    route: route.to_owned(),
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await.map_err(request_error)?;
            Ok(body.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://127.0.0.1:5000", "/", "http://127.0.0.1:5000/")]
    #[case("http://127.0.0.1:5000", "/success", "http://127.0.0.1:5000/success")]
    #[case("http://localhost/app", "/blog/", "http://localhost/app/blog/")]
    #[case("http://localhost/app/", "feed.xml", "http://localhost/app/feed.xml")]
    fn routes_join_onto_origin(#[case] origin: &str, #[case] route: &str, #[case] expected: &str) {
        let source = HttpPageSource::new(origin).expect("origin should parse");
        let url = source.url_for(route).expect("route should join");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn unusable_origins_are_rejected(#[case] origin: &str) {
        let err = HttpPageSource::new(origin).expect_err("origin should be rejected");
        assert!(
            matches!(err, FreezeError::InvalidOrigin { .. }),
            "unexpected error: {err}"
        );
    }
}
