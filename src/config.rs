//! Configuration management for vsts-wiql.
//!
//! Settings are layered from lowest to highest precedence:
//! - TOML configuration file following the XDG Base Directory specification
//! - Environment variables (`VSTS_*`)
//! - Command-line arguments
//!
//! ## Example
//!
//! ```rust,no_run
//! use vsts_wiql::Config;
//!
//! let config = Config::default()
//!     .merge(Config::load_from_file().unwrap())
//!     .merge(Config::load_from_env());
//! let resolved = config.resolve().unwrap();
//! println!("PAT from: {}", resolved.pat.source_description());
//! ```

use crate::{error::ConfigError, parsed_property::ParsedProperty};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default overall timeout for a single request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_INSTANCE: &str = "VSTS_INSTANCE";
const ENV_PAT: &str = "VSTS_PAT";
const ENV_BASE_URL: &str = "VSTS_BASE_URL";
const ENV_REQUEST_TIMEOUT_SECS: &str = "VSTS_REQUEST_TIMEOUT_SECS";

/// Temporary struct for deserializing TOML configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    pub instance: Option<String>,
    pub pat: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Partially specified configuration from a single source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Instance (organization) name, as in `https://{instance}.visualstudio.com`.
    pub instance: Option<ParsedProperty<String>>,
    /// Personal access token.
    pub pat: Option<ParsedProperty<String>>,
    /// Explicit service base URL, overriding the one derived from `instance`.
    pub base_url: Option<ParsedProperty<String>>,
    /// Overall timeout for a single request, in seconds.
    pub request_timeout_secs: Option<ParsedProperty<u64>>,
}

/// Fully resolved configuration, ready to build a client from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Unset only when `base_url` is given.
    pub instance: Option<ParsedProperty<String>>,
    pub pat: ParsedProperty<String>,
    pub base_url: Option<ParsedProperty<String>>,
    pub request_timeout_secs: ParsedProperty<u64>,
}

impl Config {
    /// Load configuration from the XDG config directory.
    ///
    /// A missing file yields an empty configuration.
    #[must_use = "this returns the loaded configuration which should be used"]
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content =
            fs::read_to_string(config_path).map_err(|e| ConfigError::FileReadError {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let config_file: ConfigFile =
            toml::from_str(&config_content).map_err(|e| ConfigError::ParseError {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let path = config_path.to_path_buf();
        Ok(Self {
            instance: config_file
                .instance
                .map(|v| ParsedProperty::File(v.clone(), path.clone(), v)),
            pat: config_file
                .pat
                .map(|v| ParsedProperty::File(v.clone(), path.clone(), v)),
            base_url: config_file
                .base_url
                .map(|v| ParsedProperty::File(v.clone(), path.clone(), v)),
            request_timeout_secs: config_file
                .request_timeout_secs
                .map(|v| ParsedProperty::File(v, path.clone(), v.to_string())),
        })
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            instance: std::env::var(ENV_INSTANCE)
                .ok()
                .map(|v| ParsedProperty::Env(v.clone(), v)),
            pat: std::env::var(ENV_PAT)
                .ok()
                .map(|v| ParsedProperty::Env(v.clone(), v)),
            base_url: std::env::var(ENV_BASE_URL)
                .ok()
                .map(|v| ParsedProperty::Env(v.clone(), v)),
            request_timeout_secs: std::env::var(ENV_REQUEST_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.parse().ok().map(|v| ParsedProperty::Env(v, s))),
        }
    }

    /// Get the XDG config file path for vsts-wiql
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config"),
        };

        Ok(config_dir.join("vsts-wiql").join("config.toml"))
    }

    /// Merge this config with another, preferring values from other when they exist
    pub fn merge(self, other: Self) -> Self {
        Self {
            instance: other.instance.or(self.instance),
            pat: other.pat.or(self.pat),
            base_url: other.base_url.or(self.base_url),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
        }
    }

    /// Validate required fields and fill in defaults.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        if self.instance.is_none() && self.base_url.is_none() {
            return Err(ConfigError::MissingRequired {
                field: "instance".to_string(),
                env_var: ENV_INSTANCE.to_string(),
            });
        }
        let pat = self.pat.ok_or_else(|| ConfigError::MissingRequired {
            field: "pat".to_string(),
            env_var: ENV_PAT.to_string(),
        })?;

        let request_timeout_secs = self
            .request_timeout_secs
            .unwrap_or(ParsedProperty::Default(DEFAULT_REQUEST_TIMEOUT_SECS));
        if *request_timeout_secs.value() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(ResolvedConfig {
            instance: self.instance,
            pat,
            base_url: self.base_url,
            request_timeout_secs,
        })
    }

    /// Create a sample config file for user reference
    #[must_use = "this operation can fail and the result should be checked"]
    pub fn create_sample_config() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        Self::write_sample_config(&config_path)?;
        Ok(config_path)
    }

    /// Writes the sample config to `config_path` unless a file already exists there.
    pub fn write_sample_config(config_path: &Path) -> Result<()> {
        if config_path.exists() {
            return Ok(());
        }

        if let Some(dir) = config_path.parent()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationError {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let sample_config = r#"# vsts-wiql Configuration File
# This file follows the XDG Base Directory specification
# Location: ~/.config/vsts-wiql/config.toml

# Instance (organization) name, as in https://{instance}.visualstudio.com (required)
# instance = "your-organization"

# Personal Access Token (required, but consider using environment variable VSTS_PAT instead)
# pat = "your-pat-token"

# Explicit service URL, overrides the URL derived from instance (optional)
# base_url = "https://dev.azure.com/your-organization"

# Overall timeout for a single request in seconds (optional, defaults to 30)
request_timeout_secs = 30
"#;

        fs::write(config_path, sample_config).with_context(|| {
            format!(
                "Failed to write sample config to: {}",
                config_path.display()
            )
        })?;

        Ok(())
    }
}
