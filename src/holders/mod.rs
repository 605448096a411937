mod api;
mod model;
mod wire;

pub use model::{InsiderTransaction, InstitutionalHolder};

use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
};

/// A builder for fetching holder data for a specific symbol.
///
/// Each method requests only its own quoteSummary module, so one list failing
/// never takes another down with it.
pub struct HoldersBuilder {
    client: YfClient,
    symbol: String,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl HoldersBuilder {
    /// Creates a new `HoldersBuilder` for a given symbol.
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

    /// Fetches the top institutional holders, largest first as Yahoo reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn institutional_holders(&self) -> Result<Vec<InstitutionalHolder>, YfError> {
        api::ownership_list(
            &self.client,
            &self.symbol,
            api::Ownership::Institutional,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }

    /// Fetches the top mutual fund holders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn mutual_fund_holders(&self) -> Result<Vec<InstitutionalHolder>, YfError> {
        api::ownership_list(
            &self.client,
            &self.symbol,
            api::Ownership::Fund,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }

    /// Fetches recent insider transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is missing.
    pub async fn insider_transactions(&self) -> Result<Vec<InsiderTransaction>, YfError> {
        api::insider_transactions(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }
}
