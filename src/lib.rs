//! # vsts-wiql
//!
//! A client for running WIQL work item queries against VSTS / Azure DevOps.
//!
//! - Ad-hoc queries returning flat or hierarchical results
//! - Stored queries by id, decoded into the shape the caller asks for
//! - A pluggable HTTP transport, with a reqwest implementation included
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use vsts_wiql::{Config, VstsClient};
//! use vsts_wiql::models::FlatWorkItemsQueryResult;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::load_from_file()?
//!     .merge(Config::load_from_env())
//!     .resolve()?;
//! let client = VstsClient::from_config(&config)?;
//! let token = CancellationToken::new();
//!
//! let flat = client
//!     .execute_flat_query("SELECT [System.Id] FROM WorkItems", &token)
//!     .await?;
//! println!("{} work items as of {}", flat.work_items.len(), flat.as_of);
//!
//! let id = "6f1b3c0e-9d2a-4b8e-a1c3-0123456789ab".parse()?;
//! let stored: FlatWorkItemsQueryResult = client.execute_stored_query(id, &token).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod parsed_property;

// Re-export commonly used types for convenience
pub use api::VstsClient;
pub use config::{Config, ResolvedConfig};
pub use models::{WorkItemsQuery, WorkItemsQueryResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git hash the crate was built from
pub const GIT_HASH: &str = env!("GIT_HASH");
