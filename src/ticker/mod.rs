mod info;
mod model;
mod options;

pub use model::{Info, OptionChain, OptionContract};

use std::time::Duration;

use chrono::NaiveDate;

use crate::analysis::{AnalysisBuilder, RecommendationRow, UpgradeDowngradeRow};
use crate::core::{CacheMode, Candle, Range, RetryConfig, YfClient, YfError};
use crate::fundamentals::{
    Calendar, EarningsHistoryRow, FinancialStatement, Frequency, FundamentalsBuilder,
    StatementType,
};
use crate::history::HistoryBuilder;
use crate::holders::{HoldersBuilder, InsiderTransaction, InstitutionalHolder};

/// A high-level interface for a single ticker symbol.
///
/// A `Ticker` is created with a [`YfClient`] and a symbol and shares the client's
/// rate limiter and response cache. Each method maps to one upstream request
/// (a quoteSummary module set, the chart endpoint or the options endpoint).
///
/// # Example
///
/// ```no_run
/// # use yfinance_agent::{Range, Ticker, YfClient};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = YfClient::builder().build()?;
/// let ticker = Ticker::new(&client, "AAPL");
///
/// let history = ticker.history(Range::M1).await?;
/// println!("fetched {} daily bars", history.len());
///
/// let expiries = ticker.options().await?;
/// println!("{} listed expiries", expiries.len());
/// # Ok(())
/// # }
/// ```
pub struct Ticker {
    client: YfClient,
    symbol: String,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    options_timeout: Option<Duration>,
}

impl Ticker {
    /// Creates a new `Ticker` for a given symbol.
    pub fn new(client: &YfClient, symbol: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            symbol: symbol.into(),
            cache_mode: CacheMode::Use,
            retry_override: None,
            options_timeout: None,
        }
    }

    /// The symbol this ticker was created for.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Sets the cache mode for all subsequent API calls made by this `Ticker` instance.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the client's default retry policy for all subsequent API calls made by this `Ticker` instance.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Bounds each options request to `limit` once the rate limiter has admitted it.
    /// Time spent queued behind the limiter does not count. An overrun is
    /// [`YfError::Timeout`].
    #[must_use]
    pub const fn options_timeout(mut self, limit: Option<Duration>) -> Self {
        self.options_timeout = limit;
        self
    }

    /// Fetches general information (profile, key statistics, pricing) as a flat map.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Yahoo returns no modules for the symbol.
    #[tracing::instrument(level = "debug", skip(self), err(level = "debug"), fields(symbol = %self.symbol))]
    pub async fn info(&self) -> Result<Info, YfError> {
        info::fetch_info(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }

    /* ---------------- History ---------------- */

    /// Fetches adjusted daily price history over `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the chart payload is invalid.
    pub async fn history(&self, range: Range) -> Result<Vec<Candle>, YfError> {
        HistoryBuilder::new(&self.client, &self.symbol)
            .range(range)
            .cache_mode(self.cache_mode)
            .retry_policy(self.retry_override.clone())
            .fetch()
            .await
    }

    /* ---------------- Options ---------------- */

    /// Lists the option expiry dates Yahoo publishes for the symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is invalid.
    #[tracing::instrument(level = "debug", skip(self), err(level = "debug"), fields(symbol = %self.symbol))]
    pub async fn options(&self) -> Result<Vec<NaiveDate>, YfError> {
        options::expiration_dates(
            &self.client,
            &self.symbol,
            self.cache_mode,
            self.retry_override.as_ref(),
            self.options_timeout,
        )
        .await
    }

    /// Fetches the option chain for `expiry`, or for the nearest expiry when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is invalid.
    #[tracing::instrument(level = "debug", skip(self), err(level = "debug"), fields(symbol = %self.symbol))]
    pub async fn option_chain(&self, expiry: Option<NaiveDate>) -> Result<OptionChain, YfError> {
        options::option_chain(
            &self.client,
            &self.symbol,
            expiry,
            self.cache_mode,
            self.retry_override.as_ref(),
            self.options_timeout,
        )
        .await
    }

    /* ---------------- Holders ---------------- */

    fn holders_builder(&self) -> HoldersBuilder {
        HoldersBuilder::new(&self.client, &self.symbol)
            .cache_mode(self.cache_mode)
            .retry_policy(self.retry_override.clone())
    }

    /// Fetches the top institutional holders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn institutional_holders(&self) -> Result<Vec<InstitutionalHolder>, YfError> {
        self.holders_builder().institutional_holders().await
    }

    /// Fetches the top mutual fund holders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn mutual_fund_holders(&self) -> Result<Vec<InstitutionalHolder>, YfError> {
        self.holders_builder().mutual_fund_holders().await
    }

    /// Fetches recent insider transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn insider_transactions(&self) -> Result<Vec<InsiderTransaction>, YfError> {
        self.holders_builder().insider_transactions().await
    }

    /* ---------------- Analysis ---------------- */

    fn analysis_builder(&self) -> AnalysisBuilder {
        AnalysisBuilder::new(&self.client, &self.symbol)
            .cache_mode(self.cache_mode)
            .retry_policy(self.retry_override.clone())
    }

    /// Fetches the analyst recommendation trend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn recommendations(&self) -> Result<Vec<RecommendationRow>, YfError> {
        self.analysis_builder().recommendations().await
    }

    /// Fetches analyst upgrades and downgrades.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn upgrades_downgrades(&self) -> Result<Vec<UpgradeDowngradeRow>, YfError> {
        self.analysis_builder().upgrades_downgrades().await
    }

    /* ---------------- Fundamentals ---------------- */

    fn fundamentals_builder(&self) -> FundamentalsBuilder {
        FundamentalsBuilder::new(&self.client, &self.symbol)
            .cache_mode(self.cache_mode)
            .retry_policy(self.retry_override.clone())
    }

    /// Fetches one financial statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the statement is missing.
    pub async fn financial_statement(
        &self,
        kind: StatementType,
        frequency: Frequency,
    ) -> Result<FinancialStatement, YfError> {
        self.fundamentals_builder().statement(kind, frequency).await
    }

    /// Fetches upcoming earnings and dividend dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn calendar(&self) -> Result<Calendar, YfError> {
        self.fundamentals_builder().calendar().await
    }

    /// Fetches reported versus estimated EPS for recent quarters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the data is missing.
    pub async fn earnings_history(&self) -> Result<Vec<EarningsHistoryRow>, YfError> {
        self.fundamentals_builder().earnings_history().await
    }
}
