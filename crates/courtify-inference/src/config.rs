//! Remote client configuration.
//!
//! Values come from environment variables with defaults from
//! [`courtify_core::defaults`]:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COURTIFY_API_BASE_URL` | `http://localhost:8000` | Remote service base URL |
//! | `COURTIFY_REQUEST_TIMEOUT_SECS` | `30` | Per-request timeout |

use std::time::Duration;

use courtify_core::defaults;
use courtify_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings for the remote analysis/chat service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote service, without trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds; expiry counts as a transport failure.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables (with defaults).
    pub fn from_env() -> Self {
        let base_url = std::env::var(defaults::ENV_API_BASE_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| defaults::API_BASE_URL.to_string());
        let timeout_secs =
            defaults::env_or(defaults::ENV_REQUEST_TIMEOUT_SECS, defaults::REQUEST_TIMEOUT_SECS);

        Self::default()
            .with_base_url(base_url)
            .with_timeout_secs(timeout_secs)
    }

    /// Set the base URL. A trailing slash is stripped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for an endpoint path such as `"/chat"`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url cannot be empty".to_string()));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = ClientConfig::default().with_base_url("http://api.local:9000/");
        assert_eq!(config.base_url, "http://api.local:9000");
        assert_eq!(config.endpoint("/chat"), "http://api.local:9000/chat");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::default().with_base_url("ftp://example.com");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = ClientConfig::default().with_base_url("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::default().with_timeout_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_duration() {
        let config = ClientConfig::default().with_timeout_secs(5);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
