//! Contents API: path-addressed probe and upsert.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Method, StatusCode};

use super::types::{ContentsEntry, PutContentsBody, PutContentsResponse};
use super::{GithubClient, GithubError};
use crate::store::{
    ContentStore, ProbeOutcome, RemoteTarget, RevisionMarker, StoreFuture, UpsertOutcome,
    UpsertRequest,
};

impl ContentStore for GithubClient {
    type Error = GithubError;

    fn probe<'a>(
        &'a self,
        target: &'a RemoteTarget,
    ) -> StoreFuture<'a, ProbeOutcome, Self::Error> {
        Box::pin(async move {
            let mut url = self.contents_url(target)?;
            url.query_pairs_mut().append_pair("ref", &target.branch);
            let (status, body) = self
                .send(self.request(Method::GET, url.clone()), &url)
                .await?;
            Ok(classify_probe(status, &body))
        })
    }

    fn upsert<'a>(
        &'a self,
        request: &'a UpsertRequest,
    ) -> StoreFuture<'a, UpsertOutcome, Self::Error> {
        Box::pin(async move {
            let url = self.contents_url(&request.target)?;
            let payload = PutContentsBody {
                message: &request.message,
                content: BASE64.encode(&request.content),
                branch: &request.target.branch,
                sha: request.revision.as_ref().map(RevisionMarker::as_str),
            };
            let builder = self.request(Method::PUT, url.clone()).json(&payload);
            let (status, body) = self.send(builder, &url).await?;
            Ok(classify_upsert(status, &body))
        })
    }
}

/// Maps a contents `GET` response onto a probe outcome.
///
/// A 200 for a directory returns a JSON array; it still counts as present but
/// carries no revision.
pub(super) fn classify_probe(status: StatusCode, body: &str) -> ProbeOutcome {
    match status {
        StatusCode::OK => ProbeOutcome::Present {
            revision: serde_json::from_str::<ContentsEntry>(body)
                .ok()
                .map(|entry| RevisionMarker::new(entry.sha)),
        },
        StatusCode::NOT_FOUND => ProbeOutcome::Absent,
        other => ProbeOutcome::Unexpected {
            status: other.as_u16(),
            body: body.to_owned(),
        },
    }
}

/// Maps a contents `PUT` response onto an upsert outcome.
pub(super) fn classify_upsert(status: StatusCode, body: &str) -> UpsertOutcome {
    if status.is_success() {
        let revision = serde_json::from_str::<PutContentsResponse>(body)
            .ok()
            .and_then(|response| response.content)
            .map(|entry| RevisionMarker::new(entry.sha));
        return UpsertOutcome::Written { revision };
    }

    UpsertOutcome::Rejected {
        status: status.as_u16(),
        body: body.to_owned(),
    }
}
