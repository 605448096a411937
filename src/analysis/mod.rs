mod api;
mod model;
mod wire;

pub use model::{RecommendationRow, UpgradeDowngradeRow};

use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
};

/// A builder for fetching analyst-related data for a specific symbol.
pub struct AnalysisBuilder {
    client: YfClient,
    symbol: String,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl AnalysisBuilder {
    /// Creates a new `AnalysisBuilder` for a given symbol.
    pub fn new(client: &YfClient, symbol: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            symbol: symbol.into(),
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    /// Sets the cache mode for this specific API call.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Fetches the analyst recommendation trend, most recent period first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn recommendations(self) -> Result<Vec<RecommendationRow>, YfError> {
        api::recommendation_trend(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }

    /// Fetches the history of analyst upgrades and downgrades, in provider order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn upgrades_downgrades(self) -> Result<Vec<UpgradeDowngradeRow>, YfError> {
        api::upgrades_downgrades(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }
}
