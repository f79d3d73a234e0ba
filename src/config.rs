//! Client configuration.
//!
//! Values are layered, later sources winning:
//! 1. Built-in defaults
//! 2. A JSON file (`<config dir>/celine-chat/config.json`, or an explicit path)
//! 3. `CELINE_*` environment variables and command-line flags, both read
//!    by the argument parser in [`crate::cli::args`] and applied with the
//!    `with_*` setters

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::client::DEFAULT_BASE_URL;
use crate::models::DEFAULT_TOP_K;
use crate::state::PartialReplyPolicy;

/// Default connect timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Settings for talking to the assistant backend.
///
/// # Example
///
/// ```ignore
/// use celine_chat::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://assistant.example.com")
///     .with_top_k(8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL
    pub base_url: String,
    /// Chunks retrieved per question
    pub top_k: u32,
    /// Ask the backend for a `sources` event
    pub include_citations: bool,
    /// How long to wait for a connection. Streaming replies are not cut off.
    pub request_timeout: Duration,
    /// What happens to a partial reply when the backend reports an error
    pub partial_reply_policy: PartialReplyPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            top_k: DEFAULT_TOP_K,
            include_citations: true,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            partial_reply_policy: PartialReplyPolicy::default(),
        }
    }
}

/// On-disk form. Every field is optional and overrides the default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: Option<String>,
    top_k: Option<u32>,
    include_citations: Option<bool>,
    timeout_secs: Option<u64>,
    partial_reply_policy: Option<PartialReplyPolicy>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_include_citations(mut self, include: bool) -> Self {
        self.include_citations = include;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_partial_reply_policy(mut self, policy: PartialReplyPolicy) -> Self {
        self.partial_reply_policy = policy;
        self
    }

    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("celine-chat").join("config.json"))
    }

    /// Load defaults, then the config file.
    ///
    /// An explicit `path` must exist. The default path is skipped when the
    /// file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::default().merge_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::default().merge_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Overlay values from a JSON file.
    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "Loaded config file");
        self.merge(file)
    }

    fn merge(mut self, file: ConfigFile) -> Result<Self, ConfigError> {
        if let Some(url) = file.base_url {
            self = self.with_base_url(validate_base_url("base_url", &url)?);
        }
        if let Some(top_k) = file.top_k {
            self.top_k = validate_top_k("top_k", top_k)?;
        }
        if let Some(include) = file.include_citations {
            self.include_citations = include;
        }
        if let Some(secs) = file.timeout_secs {
            self.request_timeout = validate_timeout("timeout_secs", secs)?;
        }
        if let Some(policy) = file.partial_reply_policy {
            self.partial_reply_policy = policy;
        }
        Ok(self)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Check that `url` is an absolute http(s) URL.
pub fn validate_base_url(key: &str, url: &str) -> Result<String, ConfigError> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(invalid(key, url))
    }
}

fn validate_top_k(key: &str, top_k: u32) -> Result<u32, ConfigError> {
    if top_k == 0 {
        Err(invalid(key, "0"))
    } else {
        Ok(top_k)
    }
}

fn validate_timeout(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        Err(invalid(key, "0"))
    } else {
        Ok(Duration::from_secs(secs))
    }
}
