//! Financial statements, the earnings calendar and reported earnings history.

mod api;
mod model;
mod wire;

pub use model::{
    Calendar, EarningsHistoryRow, FinancialStatement, Frequency, StatementRow, StatementType,
};

use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
};

/// A builder for fetching fundamentals for a specific symbol.
pub struct FundamentalsBuilder {
    client: YfClient,
    symbol: String,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl FundamentalsBuilder {
    /// Creates a new `FundamentalsBuilder` for a given symbol.
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

    /// Fetches one financial statement in the requested frequency.
    ///
    /// Only the quoteSummary module for that statement and frequency is requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Yahoo has no such statement for the symbol.
    pub async fn statement(
        &self,
        kind: StatementType,
        frequency: Frequency,
    ) -> Result<FinancialStatement, YfError> {
        api::statement(
            &self.client,
            &self.symbol,
            kind,
            frequency,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }

    /// Fetches upcoming earnings and dividend dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn calendar(&self) -> Result<Calendar, YfError> {
        api::calendar(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }

    /// Fetches reported versus estimated EPS for recent quarters, in provider order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn earnings_history(&self) -> Result<Vec<EarningsHistoryRow>, YfError> {
        api::earnings_history(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }
}
