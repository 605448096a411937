//! Public client surface + builder.
//!
//! Every outbound request goes through [`YfClient`]: the response cache is consulted
//! first, and only a miss waits on the token-bucket limiter before touching the network.
//! Internals are split into `auth` (cookie/crumb), `constants` (UA + defaults) and
//! `retry` (retry policy and cache modes).

mod auth;
mod constants;
pub mod retry;

pub use retry::{Backoff, CacheMode, RetryConfig};

use crate::core::YfError;
use crate::core::cache::{CacheStore, fingerprint};
use constants::{
    DEFAULT_BASE_CHART, DEFAULT_BASE_OPTIONS, DEFAULT_BASE_QUOTE_API, DEFAULT_COOKIE_URL,
    DEFAULT_CRUMB_URL, USER_AGENT,
};
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::{Client, RequestBuilder, Response};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use url::Url;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Default)]
struct ClientState {
    cookie: Option<String>,
    crumb: Option<String>,
}

/// A cheaply cloneable handle to a configured Yahoo Finance HTTP client.
///
/// Clones share the cookie/crumb state, the rate limiter and the response cache, so
/// one client can be handed to many concurrent tasks and they all draw from the same
/// request budget.
#[derive(Debug, Clone)]
pub struct YfClient {
    http: Client,
    base_chart: Url,
    base_quote_api: Url,
    base_options: Url,
    cookie_url: Url,
    crumb_url: Url,

    state: Arc<RwLock<ClientState>>,
    credential_fetch_lock: Arc<Mutex<()>>,

    limiter: Option<Arc<Governor>>,
    cache: Option<Arc<CacheStore>>,
    retry: RetryConfig,
}

impl YfClient {
    /// Create a new builder.
    pub fn builder() -> YfClientBuilder {
        YfClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn base_chart(&self) -> &Url {
        &self.base_chart
    }
    pub(crate) fn base_quote_api(&self) -> &Url {
        &self.base_quote_api
    }
    pub(crate) fn base_options(&self) -> &Url {
        &self.base_options
    }

    /// Whether responses are cached.
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Whether the response cache outlives the process (SQLite backed).
    pub fn cache_is_persistent(&self) -> bool {
        self.cache.as_ref().is_some_and(|c| c.is_persistent())
    }

    /// Whether outbound requests are throttled by a rate limiter.
    pub fn rate_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Drops every cached response.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent cache store cannot be written.
    pub async fn clear_cache(&self) -> Result<(), YfError> {
        match &self.cache {
            Some(store) => store.clear().await,
            None => Ok(()),
        }
    }

    /// Drops expired cached responses and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent cache store cannot be written.
    pub async fn purge_expired_cache(&self) -> Result<usize, YfError> {
        match &self.cache {
            Some(store) => store.purge_expired().await,
            None => Ok(0),
        }
    }

    pub(crate) async fn cache_get(&self, url: &Url, mode: CacheMode) -> Option<String> {
        if mode != CacheMode::Use {
            return None;
        }
        let store = self.cache.as_ref()?;
        let key = fingerprint(url);
        let hit = store.get(&key).await;
        if hit.is_some() {
            tracing::trace!(%key, "response cache hit");
        }
        hit
    }

    pub(crate) async fn cache_put(&self, url: &Url, body: &str, mode: CacheMode) {
        if mode == CacheMode::Bypass {
            return;
        }
        if let Some(store) = &self.cache {
            store.put(&fingerprint(url), body).await;
        }
    }

    /// Waits for the rate limiter to admit one request.
    async fn admit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Sends a request through the rate limiter, retrying according to the active policy.
    ///
    /// Each attempt (including retries) is admitted by the limiter separately.
    pub(crate) async fn send_with_retry(
        &self,
        req: RequestBuilder,
        retry_override: Option<&RetryConfig>,
    ) -> Result<Response, YfError> {
        let policy = retry_override.unwrap_or(&self.retry);
        let mut attempt = 0u32;

        loop {
            let Some(this_try) = req.try_clone() else {
                // Streaming bodies cannot be replayed; send once.
                self.admit().await;
                return Ok(req.send().await?);
            };

            self.admit().await;
            match this_try.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if policy.should_retry_status(status, attempt) {
                        let delay = policy.backoff.delay(attempt);
                        tracing::debug!(status, attempt, ?delay, "retrying request after status");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(e) if policy.should_retry_error(&e, attempt) => {
                    let delay = policy.backoff.delay(attempt);
                    tracing::debug!(error = %e, attempt, ?delay, "retrying request after error");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct YfClientBuilder {
    user_agent: Option<String>,
    base_chart: Option<Url>,
    base_quote_api: Option<Url>,
    base_options: Option<Url>,
    cookie_url: Option<Url>,
    crumb_url: Option<Url>,
    preauth: Option<(String, String)>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    rate_limit: Option<u32>,
    cache_ttl: Option<Duration>,
    cache_path: Option<PathBuf>,
    retry: Option<RetryConfig>,
}

impl YfClientBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the chart API base (e.g., `https://query1.finance.yahoo.com/v8/finance/chart/`).
    #[must_use]
    pub fn base_chart(mut self, url: Url) -> Self {
        self.base_chart = Some(url);
        self
    }

    /// Override the quoteSummary API base (e.g., `https://query1.finance.yahoo.com/v10/finance/quoteSummary/`).
    #[must_use]
    pub fn base_quote_api(mut self, url: Url) -> Self {
        self.base_quote_api = Some(url);
        self
    }

    /// Override the options API base (e.g., `https://query1.finance.yahoo.com/v7/finance/options/`).
    #[must_use]
    pub fn base_options(mut self, url: Url) -> Self {
        self.base_options = Some(url);
        self
    }

    /// Override the cookie bootstrap URL.
    #[must_use]
    pub fn cookie_url(mut self, url: Url) -> Self {
        self.cookie_url = Some(url);
        self
    }

    /// Override the crumb URL.
    #[must_use]
    pub fn crumb_url(mut self, url: Url) -> Self {
        self.crumb_url = Some(url);
        self
    }

    /// Seed the cookie and crumb so the first request skips the handshake.
    #[must_use]
    pub fn preauth(mut self, cookie: impl Into<String>, crumb: impl Into<String>) -> Self {
        self.preauth = Some((cookie.into(), crumb.into()));
        self
    }

    /// Set a global request timeout (overall). Default: none.
    #[must_use]
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Throttle outbound requests to at most `per_second` in any one-second window.
    /// Admissions are spaced `1s / per_second` apart with no burst, so a window can
    /// never hold more than `per_second` sends. Callers over the limit wait; they are
    /// never rejected.
    /// Default: unthrottled.
    #[must_use]
    pub fn rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = Some(per_second);
        self
    }

    /// Enable response caching with a default TTL.
    /// If not set, caching is disabled.
    #[must_use]
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// Persist cached responses in a SQLite file at `path` instead of memory.
    /// Only takes effect together with [`cache_ttl`](Self::cache_ttl).
    #[must_use]
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Install a retry policy. Default: [`RetryConfig::disabled`].
    #[must_use]
    pub fn retry_policy(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if a default URL fails to parse, the rate limit is zero, the
    /// HTTP client cannot be constructed, or the SQLite cache file cannot be opened.
    pub fn build(self) -> Result<YfClient, YfError> {
        let base_chart = self.base_chart.map_or_else(|| Url::parse(DEFAULT_BASE_CHART), Ok)?;
        let base_quote_api = self
            .base_quote_api
            .map_or_else(|| Url::parse(DEFAULT_BASE_QUOTE_API), Ok)?;
        let base_options = self
            .base_options
            .map_or_else(|| Url::parse(DEFAULT_BASE_OPTIONS), Ok)?;
        let cookie_url = self.cookie_url.map_or_else(|| Url::parse(DEFAULT_COOKIE_URL), Ok)?;
        let crumb_url = self.crumb_url.map_or_else(|| Url::parse(DEFAULT_CRUMB_URL), Ok)?;

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_store(true);
        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb.build()?;

        let limiter = match self.rate_limit {
            Some(rps) => {
                let quota = NonZeroU32::new(rps)
                    .and_then(|n| Quota::with_period(Duration::from_secs(1) / n.get()))
                    .ok_or_else(|| {
                        YfError::Config("rate limit must be greater than zero".into())
                    })?;
                Some(Arc::new(RateLimiter::direct(quota)))
            }
            None => None,
        };

        if self.cache_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(YfError::Config("cache expiry must be greater than zero".into()));
        }
        let state = match self.preauth {
            Some((cookie, crumb)) => ClientState {
                cookie: Some(cookie),
                crumb: Some(crumb),
            },
            None => ClientState::default(),
        };

        let cache = match (self.cache_ttl, self.cache_path) {
            (Some(ttl), Some(path)) => Some(Arc::new(CacheStore::sqlite(&path, ttl)?)),
            (Some(ttl), None) => Some(Arc::new(CacheStore::memory(ttl))),
            (None, _) => None,
        };

        Ok(YfClient {
            http,
            base_chart,
            base_quote_api,
            base_options,
            cookie_url,
            crumb_url,
            state: Arc::new(RwLock::new(state)),
            credential_fetch_lock: Arc::new(Mutex::new(())),
            limiter,
            cache,
            retry: self.retry.unwrap_or_else(RetryConfig::disabled),
        })
    }
}
