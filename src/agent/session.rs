use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{RetryConfig, YfClient, YfClientBuilder, YfError};

/// Settings for the shared rate-limited, cached session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Outbound requests admitted per second, spaced evenly.
    pub requests_per_second: u32,
    /// How long a cached response stays fresh.
    pub cache_expiry: Duration,
    /// SQLite cache file. `.sqlite` is appended when the name has no extension;
    /// `None` keeps the cache in memory for the lifetime of the session.
    pub cache_name: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            cache_expiry: Duration::from_secs(3600),
            cache_name: Some("yfinance.cache".to_string()),
        }
    }
}

impl SessionConfig {
    /// Resolved path of the SQLite cache file, if the cache is persistent.
    pub fn cache_path(&self) -> Option<PathBuf> {
        let name = self.cache_name.as_deref()?;
        let path = Path::new(name);
        Some(if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension("sqlite")
        })
    }

    fn validate(&self) -> Result<(), YfError> {
        if self.requests_per_second == 0 {
            return Err(YfError::Config(
                "requests_per_second must be greater than zero".into(),
            ));
        }
        if self.cache_expiry.is_zero() {
            return Err(YfError::Config("cache_expiry must be greater than zero".into()));
        }
        Ok(())
    }
}

/// One rate-limited, cached Yahoo client shared by every request an agent makes.
///
/// Cloning is cheap: clones share the limiter budget and the cache.
#[derive(Debug, Clone)]
pub struct YahooFinanceSession {
    client: YfClient,
}

impl YahooFinanceSession {
    /// Builds a session against the live Yahoo endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Config`] for a zero rate or expiry, and an error if the
    /// cache file cannot be opened or the HTTP client cannot be built.
    pub fn new(config: SessionConfig) -> Result<Self, YfError> {
        Self::with_builder(YfClient::builder(), &config)
    }

    /// Applies `config` on top of a pre-configured builder (custom endpoints, timeouts).
    ///
    /// The session never retries: retries are switched off whatever the builder had.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_builder(builder: YfClientBuilder, config: &SessionConfig) -> Result<Self, YfError> {
        config.validate()?;

        let mut builder = builder
            .rate_limit(config.requests_per_second)
            .cache_ttl(config.cache_expiry)
            .retry_policy(RetryConfig::disabled());
        if let Some(path) = config.cache_path() {
            builder = builder.cache_path(path);
        }

        let client = builder.build()?;
        tracing::debug!(
            requests_per_second = config.requests_per_second,
            cache_expiry_secs = config.cache_expiry.as_secs(),
            persistent = client.cache_is_persistent(),
            "yahoo finance session ready"
        );
        Ok(Self { client })
    }

    /// Wraps an already-built client as is.
    pub const fn from_client(client: YfClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub const fn client(&self) -> &YfClient {
        &self.client
    }
}
