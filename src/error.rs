//! Unified error handling for the vsts-wiql library.
//!
//! ## Error Categories
//!
//! - [`QueryError`]: invalid arguments rejected before any request is made
//! - [`ApiError`]: errors produced by the HTTP transport
//! - [`ConfigError`]: errors from configuration loading and validation
//!
//! Client operations return `anyhow::Result`. Errors produced by the
//! transport are handed back exactly as the transport produced them, so
//! callers match on them with `downcast_ref`:
//!
//! ```rust
//! use vsts_wiql::error::QueryError;
//!
//! let err = anyhow::Error::from(QueryError::EmptyQueryText);
//! assert!(matches!(err.downcast_ref::<QueryError>(), Some(QueryError::EmptyQueryText)));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Invalid arguments passed to a query operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No query was given.
    #[error("query must not be null")]
    NullQuery,

    /// The query text was empty or whitespace only.
    #[error("query text must not be empty")]
    EmptyQueryText,

    /// The stored query id was the nil UUID.
    #[error("query id must not be empty")]
    EmptyQueryId,
}

/// Errors that can occur when talking to the work item tracking service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API request was unauthorized (401/403).
    #[error("Unauthorized: invalid or expired Personal Access Token")]
    Unauthorized,

    /// The requested resource was not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// URL of the resource that was not found.
        resource: String,
    },

    /// The API returned an error response.
    #[error("API request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Failed to parse the API response.
    #[error("Failed to parse API response: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request was cancelled through its cancellation token.
    #[error("Request cancelled")]
    Cancelled,
}

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("{field} is required (use --{field}, {env_var} env var, or config file)")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
        /// Environment variable name for this field.
        env_var: String,
    },

    /// Failed to read the configuration file.
    #[error("Failed to read config file at {path}: {message}")]
    FileReadError {
        /// Path to the config file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// An invalid value was provided for a configuration field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the field with invalid value.
        field: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// Failed to create config directory.
    #[error("Failed to create config directory at {path}: {message}")]
    DirectoryCreationError {
        /// Path where directory creation failed.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}
