use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteConfigError {
    #[error("LEARN_API_URL is not set")]
    MissingBaseUrl,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Where and how to reach the remote data service.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    base_url: Url,
    auth_token: Option<String>,
    timeout: Duration,
}

impl RemoteConfig {
    /// # Errors
    ///
    /// Returns `RemoteConfigError::InvalidBaseUrl` unless `base_url` is an
    /// absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, RemoteConfigError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| RemoteConfigError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(RemoteConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: parsed,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Read `LEARN_API_URL`, `LEARN_API_TOKEN` and `LEARN_API_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteConfigError` if the URL is missing or a value is invalid.
    pub fn from_env() -> Result<Self, RemoteConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RemoteConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `RemoteConfigError` if the URL is missing or a value is invalid.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RemoteConfigError> {
        let base_url = lookup("LEARN_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(RemoteConfigError::MissingBaseUrl)?;
        let mut config = Self::new(&base_url)?;

        if let Some(token) = lookup("LEARN_API_TOKEN") {
            config = config.with_auth_token(token);
        }
        if let Some(raw) = lookup("LEARN_API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| RemoteConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Token sent verbatim in the `Authorization` header. Blank tokens are dropped.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.trim().is_empty()).then(|| token.trim().to_string());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
