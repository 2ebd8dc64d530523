//! WIQL query client.
//!
//! [`VstsClient`] turns query requests into calls against the WIQL endpoints
//! and returns typed results. It keeps no mutable state: every call is a
//! single request/response exchange through the injected [`HttpClient`].

use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use super::credential::PatCredential;
use super::http::ReqwestHttpClient;
use super::traits::HttpClient;
use super::urls::UrlBuilder;
use crate::config::ResolvedConfig;
use crate::error::{ConfigError, QueryError};
use crate::models::{
    FlatWorkItemsQueryResult, HierarchicalWorkItemsQueryResult, QueryResultShape, WorkItemsQuery,
    WorkItemsQueryResult,
};

/// Client for running WIQL queries.
///
/// Argument errors ([`QueryError`]) are returned before any request is made.
/// Errors from the transport are returned untouched.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use vsts_wiql::api::{PatCredential, ReqwestHttpClient, UrlBuilder, VstsClient};
/// use vsts_wiql::models::WorkItemsQuery;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let http = ReqwestHttpClient::new(
///     PatCredential::from_string("my-pat".to_string()),
///     Duration::from_secs(30),
/// )?;
/// let client = VstsClient::new(http, UrlBuilder::for_instance("my-org")?);
///
/// let query = WorkItemsQuery::flat("SELECT [System.Id] FROM WorkItems");
/// let result = client.execute_query(Some(&query), &CancellationToken::new()).await?;
/// println!("{} work items", result.work_item_ids().len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct VstsClient<H> {
    http: H,
    urls: UrlBuilder,
}

impl VstsClient<ReqwestHttpClient> {
    /// Builds a client with the reqwest transport from resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let urls = match (&config.base_url, &config.instance) {
            (Some(base_url), _) => UrlBuilder::with_base_url(base_url)?,
            (None, Some(instance)) => UrlBuilder::for_instance(instance)?,
            (None, None) => {
                return Err(ConfigError::MissingRequired {
                    field: "instance".to_string(),
                    env_var: "VSTS_INSTANCE".to_string(),
                }
                .into());
            }
        };
        let http = ReqwestHttpClient::new(
            PatCredential::from_string(config.pat.value().clone()),
            Duration::from_secs(*config.request_timeout_secs.value()),
        )?;
        Ok(Self::new(http, urls))
    }
}

impl<H: HttpClient> VstsClient<H> {
    pub fn new(http: H, urls: UrlBuilder) -> Self {
        Self { http, urls }
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Runs an ad-hoc query.
    ///
    /// The result shape follows `query.is_hierarchical`; only that one shape
    /// is requested from the transport.
    ///
    /// # Errors
    ///
    /// - [`QueryError::NullQuery`] if `query` is `None`
    /// - [`QueryError::EmptyQueryText`] if the query text is blank
    /// - whatever the transport returns, unchanged
    pub async fn execute_query(
        &self,
        query: Option<&WorkItemsQuery>,
        token: &CancellationToken,
    ) -> Result<WorkItemsQueryResult> {
        let query = query.ok_or(QueryError::NullQuery)?;
        if query.is_hierarchical {
            Ok(self.post_query::<HierarchicalWorkItemsQueryResult>(query, token).await?.into())
        } else {
            Ok(self.post_query::<FlatWorkItemsQueryResult>(query, token).await?.into())
        }
    }

    /// Runs `query` and always decodes a flat result.
    pub async fn execute_flat_query(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<FlatWorkItemsQueryResult> {
        self.post_query(&WorkItemsQuery::flat(query), token).await
    }

    /// Runs `query` and always decodes a hierarchical result.
    pub async fn execute_hierarchical_query(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<HierarchicalWorkItemsQueryResult> {
        self.post_query(&WorkItemsQuery::hierarchical(query), token).await
    }

    /// Runs the stored query `id` and decodes the response as `T`.
    ///
    /// The caller picks the shape. Use [`WorkItemsQueryResult`] to take
    /// whatever shape the stored query was authored as. The response is not
    /// checked against the requested shape.
    ///
    /// # Errors
    ///
    /// - [`QueryError::EmptyQueryId`] if `id` is the nil UUID
    /// - whatever the transport returns, unchanged
    pub async fn execute_stored_query<T: QueryResultShape>(
        &self,
        id: Uuid,
        token: &CancellationToken,
    ) -> Result<T> {
        if id.is_nil() {
            return Err(QueryError::EmptyQueryId.into());
        }

        let url = self.urls.wiql_by_id(id);
        debug!(query_id = %id, shape = T::SHAPE, "Executing stored query");
        self.http.execute_get::<T>(&url, token).await
    }

    async fn post_query<T: QueryResultShape>(
        &self,
        query: &WorkItemsQuery,
        token: &CancellationToken,
    ) -> Result<T> {
        if query.query.trim().is_empty() {
            return Err(QueryError::EmptyQueryText.into());
        }

        let url = self.urls.wiql();
        debug!(shape = T::SHAPE, "Executing WIQL query");
        self.http.execute_post::<T, _>(&url, query, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::traits::mocks::{HttpMethod, MockHttpClient};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    const INSTANCE: &str = "contoso";

    fn wiql_url() -> String {
        format!("https://{INSTANCE}.visualstudio.com/_apis/wit/wiql?api-version=4.1")
    }

    fn wiql_by_id_url(id: Uuid) -> String {
        format!("https://{INSTANCE}.visualstudio.com/_apis/wit/wiql/{id}?api-version=4.1")
    }

    fn setup() -> (Arc<MockHttpClient>, VstsClient<Arc<MockHttpClient>>) {
        let mock = Arc::new(MockHttpClient::new());
        let client = VstsClient::new(mock.clone(), UrlBuilder::for_instance(INSTANCE).unwrap());
        (mock, client)
    }

    /// Error raised by a failing transport in tests.
    #[derive(Debug, thiserror::Error)]
    #[error("object reference not set to an instance of an object")]
    struct NullReference;

    /// # Null Query Rejected
    ///
    /// Tests that a missing query is an invalid argument.
    ///
    /// ## Test Scenario
    /// - Executes `None` as the query
    ///
    /// ## Expected Outcome
    /// - QueryError::NullQuery is returned
    /// - The transport is never called
    #[tokio::test]
    async fn test_execute_query_rejects_null_query() {
        let (mock, client) = setup();

        let err = assert_err!(client.execute_query(None, &CancellationToken::new()).await);

        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::NullQuery));
        assert!(mock.calls().await.is_empty());
    }

    /// # Empty Query Text Rejected
    ///
    /// Tests that blank query text is an invalid argument.
    ///
    /// ## Test Scenario
    /// - Executes queries with empty and whitespace-only text, in both shapes
    ///
    /// ## Expected Outcome
    /// - QueryError::EmptyQueryText every time
    /// - The transport is never called
    #[tokio::test]
    async fn test_execute_query_rejects_empty_text() {
        let (mock, client) = setup();
        let token = CancellationToken::new();

        for query in [
            WorkItemsQuery::get(String::new(), false),
            WorkItemsQuery::get(String::new(), true),
            WorkItemsQuery::flat("   \n"),
        ] {
            let err = assert_err!(client.execute_query(Some(&query), &token).await);
            assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::EmptyQueryText));
        }

        let err = assert_err!(client.execute_flat_query("", &token).await);
        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::EmptyQueryText));
        let err = assert_err!(client.execute_hierarchical_query("", &token).await);
        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::EmptyQueryText));

        assert!(mock.calls().await.is_empty());
    }

    /// # Result Shape Follows Hierarchical Flag
    ///
    /// Tests that exactly one shape is requested per query.
    ///
    /// ## Test Scenario
    /// - Executes "Dummy query" with the flag off, then on
    ///
    /// ## Expected Outcome
    /// - One POST to the WIQL URL per call
    /// - Flag off requests only the flat type, flag on only the hierarchical type
    /// - The returned variant matches
    #[tokio::test]
    async fn test_execute_query_returns_correct_result_type() {
        for is_hierarchical in [false, true] {
            let (mock, client) = setup();
            mock.set_post_response(Ok(json!({}))).await;
            let token = CancellationToken::new();
            let query = WorkItemsQuery::get("Dummy query", is_hierarchical);

            let result = assert_ok!(client.execute_query(Some(&query), &token).await);

            assert_eq!(result.is_hierarchical(), is_hierarchical);
            let calls = mock.calls().await;
            assert_eq!(calls.len(), 1);
            let call = &calls[0];
            assert_eq!(call.method, HttpMethod::Post);
            assert!(call.url.eq_ignore_ascii_case(&wiql_url()));
            assert_eq!(call.body, Some(json!({ "query": "Dummy query" })));
            assert_eq!(
                call.requested::<HierarchicalWorkItemsQueryResult>(),
                is_hierarchical
            );
            assert_eq!(call.requested::<FlatWorkItemsQueryResult>(), !is_hierarchical);
        }
    }

    /// # Flat Query Convenience Wrapper
    ///
    /// Tests that the flat wrapper always requests a flat result.
    ///
    /// ## Test Scenario
    /// - Executes "Dummy query" through execute_flat_query
    ///
    /// ## Expected Outcome
    /// - Exactly one POST to the WIQL URL requesting the flat type
    /// - The server's work items come back
    #[tokio::test]
    async fn test_execute_flat_query_returns_flat_results() {
        let (mock, client) = setup();
        mock.set_post_response(Ok(json!({
            "queryType": "flat",
            "workItems": [{ "id": 5 }]
        })))
        .await;

        let result = assert_ok!(
            client
                .execute_flat_query("Dummy query", &CancellationToken::new())
                .await
        );

        assert_eq!(result.work_items.len(), 1);
        assert_eq!(result.work_items[0].id, 5);
        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Post);
        assert_eq!(calls[0].url, wiql_url());
        assert!(calls[0].requested::<FlatWorkItemsQueryResult>());
    }

    /// # Hierarchical Query Convenience Wrapper
    ///
    /// Tests that the hierarchical wrapper always requests a tree result.
    ///
    /// ## Test Scenario
    /// - Executes "Dummy query" through execute_hierarchical_query
    ///
    /// ## Expected Outcome
    /// - Exactly one POST to the WIQL URL requesting the hierarchical type
    #[tokio::test]
    async fn test_execute_hierarchical_query_returns_hierarchical_results() {
        let (mock, client) = setup();
        mock.set_post_response(Ok(json!({
            "queryType": "tree",
            "queryResultType": "workItemLink",
            "workItemRelations": [{ "target": { "id": 1 } }]
        })))
        .await;

        let result = assert_ok!(
            client
                .execute_hierarchical_query("Dummy query", &CancellationToken::new())
                .await
        );

        assert_eq!(result.work_item_relations.len(), 1);
        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, wiql_url());
        assert!(calls[0].requested::<HierarchicalWorkItemsQueryResult>());
        assert_eq!(calls[0].body, Some(json!({ "query": "Dummy query" })));
    }

    /// # Stored Query Rejects Nil Id
    ///
    /// Tests that the nil UUID is an invalid argument.
    ///
    /// ## Test Scenario
    /// - Executes a stored query with `Uuid::nil()`
    ///
    /// ## Expected Outcome
    /// - QueryError::EmptyQueryId and no transport call
    #[tokio::test]
    async fn test_execute_stored_query_rejects_nil_id() {
        let (mock, client) = setup();

        let err = assert_err!(
            client
                .execute_stored_query::<FlatWorkItemsQueryResult>(
                    Uuid::nil(),
                    &CancellationToken::new()
                )
                .await
        );

        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::EmptyQueryId));
        assert!(mock.calls().await.is_empty());
    }

    /// # Stored Query Returns Server Result
    ///
    /// Tests that a stored query is fetched by id and returned as-is.
    ///
    /// ## Test Scenario
    /// - Server returns a flat result with a known asOf timestamp
    ///
    /// ## Expected Outcome
    /// - One GET to `.../wiql/{id}?api-version=4.1`
    /// - The returned asOf equals the server's exactly
    #[tokio::test]
    async fn test_execute_stored_query_returns_correct_result() {
        let (mock, client) = setup();
        let id = Uuid::new_v4();
        let as_of = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 12).unwrap()
            + chrono::Duration::microseconds(654_321);
        mock.set_get_response(Ok(serde_json::to_value(FlatWorkItemsQueryResult {
            as_of,
            ..Default::default()
        })
        .unwrap()))
        .await;

        let result = assert_ok!(
            client
                .execute_stored_query::<FlatWorkItemsQueryResult>(id, &CancellationToken::new())
                .await
        );

        assert_eq!(result.as_of, as_of);
        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Get);
        assert_eq!(calls[0].url, wiql_by_id_url(id));
        assert!(calls[0].requested::<FlatWorkItemsQueryResult>());
    }

    /// # Stored Query With Automatic Shape
    ///
    /// Tests requesting whatever shape the stored query returns.
    ///
    /// ## Test Scenario
    /// - Server returns a tree result for a stored query
    ///
    /// ## Expected Outcome
    /// - WorkItemsQueryResult::Hierarchical is returned
    #[tokio::test]
    async fn test_execute_stored_query_auto_shape() {
        let (mock, client) = setup();
        mock.set_get_response(Ok(json!({
            "queryType": "tree",
            "queryResultType": "workItemLink",
            "workItemRelations": []
        })))
        .await;

        let result = assert_ok!(
            client
                .execute_stored_query::<WorkItemsQueryResult>(
                    Uuid::new_v4(),
                    &CancellationToken::new()
                )
                .await
        );

        assert!(result.is_hierarchical());
        assert!(mock.calls().await[0].requested::<WorkItemsQueryResult>());
    }

    /// # Transport Errors Propagate Unchanged
    ///
    /// Tests that the client does not catch or wrap transport failures.
    ///
    /// ## Test Scenario
    /// - Transport fails the stored query GET with a NullReference error
    ///
    /// ## Expected Outcome
    /// - The same NullReference error reaches the caller with no added context
    /// - The GET was still issued exactly once
    #[tokio::test]
    async fn test_execute_stored_query_does_not_catch_errors() {
        let (mock, client) = setup();
        let id = Uuid::new_v4();
        mock.set_get_response(Err(anyhow::Error::new(NullReference))).await;

        let err = assert_err!(
            client
                .execute_stored_query::<FlatWorkItemsQueryResult>(id, &CancellationToken::new())
                .await
        );

        assert!(err.downcast_ref::<NullReference>().is_some());
        assert_eq!(err.chain().count(), 1);
        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, wiql_by_id_url(id));
    }

    /// # Ad-hoc Query Errors Propagate Unchanged
    ///
    /// Tests the same guarantee for the POST path.
    ///
    /// ## Test Scenario
    /// - Transport fails an ad-hoc query POST
    ///
    /// ## Expected Outcome
    /// - The transport's error reaches the caller unchanged
    #[tokio::test]
    async fn test_execute_query_does_not_catch_errors() {
        let (mock, client) = setup();
        mock.set_post_response(Err(anyhow::Error::new(NullReference))).await;
        let query = WorkItemsQuery::hierarchical("Dummy query");

        let err = assert_err!(
            client
                .execute_query(Some(&query), &CancellationToken::new())
                .await
        );

        assert!(err.downcast_ref::<NullReference>().is_some());
        assert_eq!(err.chain().count(), 1);
    }

    /// # Cancellation Token Is Forwarded
    ///
    /// Tests that the caller's token reaches the transport.
    ///
    /// ## Test Scenario
    /// - Executes a query, then cancels the caller's token
    ///
    /// ## Expected Outcome
    /// - The token recorded by the transport observes the cancellation
    #[tokio::test]
    async fn test_cancellation_token_is_forwarded() {
        let (mock, client) = setup();
        mock.set_post_response(Ok(json!({}))).await;
        let token = CancellationToken::new();

        assert_ok!(client.execute_flat_query("Dummy query", &token).await);

        let recorded = mock.calls().await[0].token.clone();
        assert!(!recorded.is_cancelled());
        token.cancel();
        assert!(recorded.is_cancelled());
    }

    #[test]
    fn test_from_config_uses_base_url_override() {
        use crate::parsed_property::ParsedProperty;

        let config = ResolvedConfig {
            instance: Some(ParsedProperty::Default("contoso".to_string())),
            pat: ParsedProperty::Default("pat".to_string()),
            base_url: Some(ParsedProperty::Default(
                "https://dev.azure.com/contoso".to_string(),
            )),
            request_timeout_secs: ParsedProperty::Default(30),
        };
        let client = VstsClient::from_config(&config).unwrap();
        assert_eq!(client.urls().base(), "https://dev.azure.com/contoso");

        let config = ResolvedConfig {
            base_url: None,
            ..config
        };
        let client = VstsClient::from_config(&config).unwrap();
        assert_eq!(client.urls().base(), "https://contoso.visualstudio.com");

        let config = ResolvedConfig {
            instance: None,
            ..config
        };
        let err = VstsClient::from_config(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingRequired { .. })
        ));
    }
}
