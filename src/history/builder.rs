mod actions;
mod adjust;
mod assemble;
mod fetch;

use crate::core::client::{CacheMode, RetryConfig};
use crate::core::models::Candle;
use crate::core::{Range, YfClient, YfError};

use actions::extract_actions;
use adjust::cumulative_split_after;
use assemble::assemble_candles;
use fetch::fetch_chart;

/// A builder for fetching daily price history for a single symbol.
///
/// Defaults to one month of split- and dividend-adjusted bars with corporate actions
/// attached to the day they occurred.
#[derive(Clone)]
pub struct HistoryBuilder {
    client: YfClient,
    symbol: String,
    range: Range,
    auto_adjust: bool,
    include_actions: bool,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl HistoryBuilder {
    /// Creates a new `HistoryBuilder` for a given symbol.
    pub fn new(client: &YfClient, symbol: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            symbol: symbol.into(),
            range: Range::default(),
            auto_adjust: true,
            include_actions: true,
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

    /// Overrides the client's retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Sets the look-back window (e.g. `1mo`, `1y`).
    #[must_use]
    pub const fn range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    /// Sets whether to adjust prices for splits and dividends. (Default: `true`)
    #[must_use]
    pub const fn auto_adjust(mut self, yes: bool) -> Self {
        self.auto_adjust = yes;
        self
    }

    /// Sets whether dividends and splits are requested and attached to candles. (Default: `true`)
    #[must_use]
    pub const fn actions(mut self, yes: bool) -> Self {
        self.include_actions = yes;
        self
    }

    /// Executes the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Yahoo reports an error for the symbol,
    /// or the payload cannot be decoded.
    pub async fn fetch(self) -> Result<Vec<Candle>, YfError> {
        let fetched = fetch_chart(
            &self.client,
            &self.symbol,
            self.range,
            self.include_actions,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await?;

        let actions = extract_actions(fetched.events.as_ref());
        let cum_split_after = cumulative_split_after(&fetched.ts, &actions.splits);

        Ok(assemble_candles(
            &fetched.ts,
            &fetched.quote,
            &fetched.adjclose,
            self.auto_adjust,
            &cum_split_after,
            &actions,
        ))
    }
}
