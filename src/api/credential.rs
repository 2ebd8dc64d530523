//! PAT-based credential for the work item tracking service.
//!
//! The service accepts a Personal Access Token as the password of an HTTP
//! Basic authorization header with an empty user name.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// PAT-based credential.
///
/// The PAT is stored as a `SecretString` and is never printed.
///
/// # Example
///
/// ```rust
/// use vsts_wiql::api::PatCredential;
///
/// let credential = PatCredential::from_string("your-pat-token".to_string());
/// assert!(format!("{credential:?}").contains("[REDACTED]"));
/// ```
#[derive(Clone)]
pub struct PatCredential {
    pat: SecretString,
}

impl PatCredential {
    /// Creates a new PAT credential from a SecretString.
    pub fn new(pat: SecretString) -> Self {
        Self { pat }
    }

    /// Creates a new PAT credential from a plain string.
    pub fn from_string(pat: String) -> Self {
        Self {
            pat: SecretString::from(pat),
        }
    }

    /// Attaches the PAT to a request as Basic authorization.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth("", Some(self.pat.expose_secret()))
    }
}

impl std::fmt::Debug for PatCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatCredential")
            .field("pat", &"[REDACTED]")
            .finish()
    }
}
