//! HTTP implementation of `ReviewService`.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Call            | Request                         | Response                  |
//! |-----------------|---------------------------------|---------------------------|
//! | submit review   | `POST /reviews` `{ "files": [..] }` | `{ "id": ".." }`      |
//! | poll comments   | `GET /reviews/{id}/comments`    | `[Comment]` or `{ "comments": [..] }` |
//! | get status      | `GET /reviews/{id}/status`      | `{ "status": "running" }` |
//! | stop analysis   | `POST /reviews/{id}/stop`       | any 2xx                   |
//!
//! No request timeout is set: a slow poll only delays the next one, and the
//! event loop never waits on it.

use reqwest::{Client, RequestBuilder, StatusCode};
use revu_core::error::ServiceError;
use revu_core::service::ReviewService;
use revu_core::text::truncate;
use revu_core::types::{AnalysisStatus, ChangedFile, Comment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceSettings;

/// Longest error body kept in a `Rejected` message.
const ERROR_BODY_WIDTH: usize = 200;

pub struct HttpReviewService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    files: &'a [ChangedFile],
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(alias = "analysisId", alias = "analysis_id")]
    id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentsResponse {
    Bare(Vec<Comment>),
    Wrapped { comments: Vec<Comment> },
}

#[derive(Deserialize)]
struct StatusResponse {
    status: AnalysisStatus,
}

impl HttpReviewService {
    /// Builds a client from config. The bearer token is read from the
    /// environment variable named by `token_env`; a missing token sends
    /// unauthenticated requests.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        if settings.base_url.trim().is_empty() {
            return Err(ServiceError::Config("service.base_url is empty".into()));
        }
        let token = std::env::var(&settings.token_env).ok().filter(|t| !t.trim().is_empty());
        if token.is_none() {
            debug!(env = %settings.token_env, "no review service token set");
        }
        let client = Client::builder()
            .user_agent(concat!("revu/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self { client, base_url: settings.base_url.trim_end_matches('/').to_owned(), token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends `request` and returns the body of a 2xx response.
    async fn send(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<String, ServiceError> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ServiceError::Transport(e.to_string()))?;
        debug!(
            call = what,
            status = status.as_u16(),
            bytes = body.len(),
            "review service response"
        );
        check_status(status, body)
    }
}

fn check_status(status: StatusCode, body: String) -> Result<String, ServiceError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ServiceError::Rejected {
            status: status.as_u16(),
            message: truncate(body.trim(), ERROR_BODY_WIDTH),
        })
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))
}

fn decode_comments(body: &str) -> Result<Vec<Comment>, ServiceError> {
    Ok(match decode::<CommentsResponse>(body)? {
        CommentsResponse::Bare(comments) | CommentsResponse::Wrapped { comments } => comments,
    })
}

impl ReviewService for HttpReviewService {
    async fn submit_review(&self, files: &[ChangedFile]) -> Result<String, ServiceError> {
        let request = self.client.post(self.url("reviews")).json(&SubmitRequest { files });
        let body = self.send(request, "submit_review").await?;
        Ok(decode::<SubmitResponse>(&body)?.id)
    }

    async fn poll_comments(&self, analysis_id: &str) -> Result<Vec<Comment>, ServiceError> {
        let request = self.client.get(self.url(&format!("reviews/{analysis_id}/comments")));
        let body = self.send(request, "poll_comments").await?;
        decode_comments(&body)
    }

    async fn get_status(&self, analysis_id: &str) -> Result<AnalysisStatus, ServiceError> {
        let request = self.client.get(self.url(&format!("reviews/{analysis_id}/status")));
        let body = self.send(request, "get_status").await?;
        Ok(decode::<StatusResponse>(&body)?.status)
    }

    async fn stop_analysis(&self, analysis_id: &str) -> Result<(), ServiceError> {
        let request = self.client.post(self.url(&format!("reviews/{analysis_id}/stop")));
        self.send(request, "stop_analysis").await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_decode_bare_and_wrapped() {
        let item = r#"{"id":"1","filePath":"src/a.ts","lineStart":10,"lineEnd":10,"severity":"High","title":"Leak","content":""}"#;
        let bare = decode_comments(&format!("[{item}]")).unwrap();
        let wrapped = decode_comments(&format!(r#"{{"comments":[{item}]}}"#)).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].file_path, "src/a.ts");
    }

    #[test]
    fn status_and_id_decode() {
        let status: StatusResponse = decode(r#"{"status":"interrupted"}"#).unwrap();
        assert_eq!(status.status, AnalysisStatus::Interrupted);
        let submit: SubmitResponse = decode(r#"{"analysisId":"a-7"}"#).unwrap();
        assert_eq!(submit.id, "a-7");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode_comments("<html>"), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn non_success_status_is_rejected_with_body() {
        let err = check_status(StatusCode::UNAUTHORIZED, "bad token\n".into()).unwrap_err();
        match err {
            ServiceError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad token");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let settings = ServiceSettings {
            base_url: "https://review.example/api/".into(),
            token_env: "REVU_TEST_TOKEN_UNSET".into(),
        };
        let service = HttpReviewService::from_settings(&settings).unwrap();
        assert_eq!(service.url("reviews/1/status"), "https://review.example/api/reviews/1/status");
        assert!(service.token.is_none());
    }

    #[test]
    fn empty_base_url_is_a_config_error() {
        let settings = ServiceSettings { base_url: " ".into(), token_env: "X".into() };
        assert!(matches!(
            HttpReviewService::from_settings(&settings),
            Err(ServiceError::Config(_))
        ));
    }
}
