//! reqwest-backed implementation of [`HttpClient`].

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::credential::PatCredential;
use super::traits::HttpClient;
use crate::error::ApiError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Upper bound on how much of an error body ends up in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP transport that talks to the service with `reqwest`.
///
/// Every request carries the PAT as Basic authorization and races against
/// the caller's cancellation token.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    http: reqwest::Client,
    credential: PatCredential,
}

impl ReqwestHttpClient {
    /// Creates a transport with the given overall request timeout.
    pub fn new(credential: PatCredential, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("vsts-wiql/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self { http, credential })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.credential
            .authorize(self.http.request(method, url))
            .header(header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        request: RequestBuilder,
        method: Method,
        url: &str,
        token: &CancellationToken,
    ) -> Result<T> {
        if token.is_cancelled() {
            return Err(ApiError::Cancelled.into());
        }

        debug!(%method, url, "Sending request");
        let exchange = async {
            let response = request.send().await.map_err(ApiError::Network)?;
            let status = response.status();
            let body = response.text().await.map_err(ApiError::Network)?;
            Ok::<_, ApiError>((status, body))
        };

        let (status, body) = tokio::select! {
            _ = token.cancelled() => {
                debug!(%method, url, "Request cancelled");
                return Err(ApiError::Cancelled.into());
            }
            exchange = exchange => exchange?,
        };
        debug!(%method, url, status = status.as_u16(), "Received response");

        if !status.is_success() {
            warn!(%method, url, status = status.as_u16(), "Request failed");
            return Err(status_error(status, url, &body).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::ParseError {
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Maps a non-success status to an [`ApiError`].
fn status_error(status: StatusCode, url: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound {
            resource: url.to_string(),
        },
        _ => ApiError::RequestFailed {
            status: status.as_u16(),
            message: error_message(body),
        },
    }
}

/// Pulls the `message` member out of a service error body, falling back to
/// the (truncated) raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute_post<T, B>(&self, url: &str, body: &B, token: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync,
    {
        let request = self.request(Method::POST, url).json(body);
        self.send(request, Method::POST, url, token).await
    }

    async fn execute_get<T>(&self, url: &str, token: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self.request(Method::GET, url);
        self.send(request, Method::GET, url, token).await
    }
}
