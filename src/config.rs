//! Client configuration.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ETHYS_BASE_URL` | `https://402.ethys.dev` | API origin |
//! | `ETHYS_API_KEY` | (absent) | Legacy bearer token for trust endpoints |
//! | `ETHYS_TIMEOUT_SECS` | `30` | Per-request timeout |

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Default API origin.
pub const DEFAULT_BASE_URL: &str = "https://402.ethys.dev";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the async and blocking clients.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a config for `base_url` (trailing `/` trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| Error::InvalidUrl(format!("{e}: {base_url}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}': {base_url}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, Error> {
        let base_url =
            std::env::var("ETHYS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = std::env::var("ETHYS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut config = Self::new(&base_url)?.with_timeout(timeout);
        config.api_key = std::env::var("ETHYS_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// Keep the API key out of debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
