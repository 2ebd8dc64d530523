//! URL templates for the WIQL endpoints.

use url::Url;
use uuid::Uuid;

use crate::error::ConfigError;

/// API version sent with every work item tracking request.
pub const CURRENT_WORK_ITEMS_API_VERSION: &str = "4.1";

/// Builds WIQL endpoint URLs for one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base: String,
}

impl UrlBuilder {
    /// Base URL of the form `https://{instance}.visualstudio.com`.
    pub fn for_instance(instance: &str) -> Result<Self, ConfigError> {
        let instance = instance.trim();
        if instance.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "instance".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let base = format!("https://{instance}.visualstudio.com");
        let parsed = Url::parse(&base).map_err(|e| ConfigError::InvalidValue {
            field: "instance".to_string(),
            message: e.to_string(),
        })?;

        // Anything that leaks past the host (paths, ports, credentials) is not an instance name.
        let expected_host = format!("{}.visualstudio.com", instance.to_lowercase());
        if parsed.host_str() != Some(expected_host.as_str())
            || parsed.path() != "/"
            || parsed.port().is_some()
        {
            return Err(ConfigError::InvalidValue {
                field: "instance".to_string(),
                message: format!("'{instance}' is not a valid instance name"),
            });
        }

        Ok(Self { base })
    }

    /// Uses an explicit base URL, e.g. `https://dev.azure.com/my-org`.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            message: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        // Endpoint paths are appended as text, so the base must end at its path.
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: "must not contain a query string or fragment".to_string(),
            });
        }

        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/_apis/wit/wiql?api-version={version}`
    pub fn wiql(&self) -> String {
        format!(
            "{}/_apis/wit/wiql?api-version={}",
            self.base, CURRENT_WORK_ITEMS_API_VERSION
        )
    }

    /// `{base}/_apis/wit/wiql/{id}?api-version={version}`
    pub fn wiql_by_id(&self, id: Uuid) -> String {
        format!(
            "{}/_apis/wit/wiql/{}?api-version={}",
            self.base, id, CURRENT_WORK_ITEMS_API_VERSION
        )
    }
}
