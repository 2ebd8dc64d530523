//! Work item tracking API client.
//!
//! [`VstsClient`] maps query operations onto the WIQL REST endpoints and
//! hands the requests to an [`HttpClient`] transport. [`ReqwestHttpClient`]
//! is the production transport; tests substitute a mock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use vsts_wiql::api::{PatCredential, ReqwestHttpClient, UrlBuilder, VstsClient};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let http = ReqwestHttpClient::new(
//!     PatCredential::from_string("my-pat".to_string()),
//!     Duration::from_secs(30),
//! )?;
//! let client = VstsClient::new(http, UrlBuilder::for_instance("my-org")?);
//!
//! let tree = client
//!     .execute_hierarchical_query(
//!         "SELECT [System.Id] FROM WorkItemLinks MODE (Recursive)",
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("{} links", tree.work_item_relations.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod credential;
mod http;
mod traits;
mod urls;

pub use client::VstsClient;
pub use credential::PatCredential;
pub use http::ReqwestHttpClient;
pub use traits::HttpClient;
pub use urls::{CURRENT_WORK_ITEMS_API_VERSION, UrlBuilder};
