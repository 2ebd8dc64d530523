//! Transport abstraction for the work item tracking REST API.
//!
//! The query client never talks to the network directly. It builds a URL and
//! a body, then hands both to an [`HttpClient`], which is responsible for
//! sending the request and decoding the JSON response into the type the
//! client asks for. This keeps the client testable with a mock transport.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// Trait for the HTTP operations the query client needs.
///
/// Implementations must honour the cancellation token: once it is
/// cancelled, an in-flight request should be abandoned and an error
/// returned. Errors are returned as-is to the caller of the client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends `body` as JSON to `url` with POST and decodes the response as `T`.
    async fn execute_post<T, B>(&self, url: &str, body: &B, token: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync;

    /// Sends a GET to `url` and decodes the response as `T`.
    async fn execute_get<T>(&self, url: &str, token: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static;
}

#[async_trait]
impl<H: HttpClient> HttpClient for Arc<H> {
    async fn execute_post<T, B>(&self, url: &str, body: &B, token: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Sync,
    {
        (**self).execute_post(url, body, token).await
    }

    async fn execute_get<T>(&self, url: &str, token: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        (**self).execute_get(url, token).await
    }
}
