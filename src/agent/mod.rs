//! The data access facade.
//!
//! [`YahooFinanceAgent`] owns one [`YahooFinanceSession`] and exposes one method per data
//! category. Plain accessors never fail loudly: an upstream error is logged at error
//! level together with the ticker and the method returns `None`. The options methods
//! return `Result<_, OptionsError>` so callers get a message explaining an empty outcome.

mod options;
mod session;

pub use options::{
    OptionRecord, OptionType, OptionsError, OptionsFilter, fetch_chain, fetch_filtered,
};
pub use session::{SessionConfig, YahooFinanceSession};

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::analysis::{RecommendationRow, UpgradeDowngradeRow};
use crate::core::{Candle, Range, YfError};
use crate::fundamentals::{
    Calendar, EarningsHistoryRow, FinancialStatement, Frequency, StatementType,
};
use crate::holders::{InsiderTransaction, InstitutionalHolder};
use crate::ticker::{Info, Ticker};

pub const DEFAULT_RECOMMENDATIONS_LIMIT: usize = 5;
pub const DEFAULT_UPGRADES_LIMIT: usize = 5;
pub const DEFAULT_HOLDERS_TOP_N: usize = 20;
/// Three years of quarterly reports.
pub const DEFAULT_EARNINGS_LIMIT: usize = 12;
pub const DEFAULT_INSIDER_LIMIT: usize = 30;

/// Tuning for the filtered options fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Upper bound on per-expiry chain fetches in flight at once.
    /// Defaults to `min(32, available cores + 4)`.
    pub max_concurrency: usize,
    /// Per-expiry deadline. A chain that misses it is skipped like any failed expiry.
    pub expiry_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            max_concurrency: cores.saturating_add(4).min(32),
            expiry_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Retrieves financial data from Yahoo Finance through one shared rate-limited, cached session.
///
/// # Example
///
/// ```no_run
/// # use yfinance_agent::{OptionsFilter, Range, YahooFinanceAgent};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let agent = YahooFinanceAgent::new(None)?;
///
/// if let Some(bars) = agent.get_price_history("AAPL", Range::M1).await {
///     println!("{} bars", bars.len());
/// }
///
/// let filter = OptionsFilter::new().start_date("2025-01-01").strike_lower(150.0);
/// match agent.get_filtered_options("AAPL", &filter).await {
///     Ok(rows) => println!("{} contracts", rows.len()),
///     Err(e) => println!("{e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct YahooFinanceAgent {
    session: YahooFinanceSession,
    config: AgentConfig,
}

impl YahooFinanceAgent {
    /// Creates an agent on `session`, or on a new default session when `None`.
    ///
    /// # Errors
    ///
    /// Only when a default session has to be built and that fails (e.g. the cache file
    /// cannot be opened).
    pub fn new(session: Option<YahooFinanceSession>) -> Result<Self, YfError> {
        let session = match session {
            Some(s) => s,
            None => YahooFinanceSession::new(SessionConfig::default())?,
        };
        Ok(Self::with_session(session))
    }

    /// Creates an agent sharing an existing session.
    pub fn with_session(session: YahooFinanceSession) -> Self {
        Self {
            session,
            config: AgentConfig::default(),
        }
    }

    /// Replaces the fan-out settings.
    #[must_use]
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn session(&self) -> &YahooFinanceSession {
        &self.session
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn ticker(&self, ticker: &str) -> Ticker {
        Ticker::new(self.session.client(), ticker)
    }

    /// General information about a ticker, or `None` on failure.
    pub async fn get_ticker_info(&self, ticker: &str) -> Option<Info> {
        or_log(self.ticker(ticker).info().await, ticker, "ticker info")
    }

    /// Upcoming earnings and dividend dates, or `None` on failure.
    pub async fn get_calendar(&self, ticker: &str) -> Option<Calendar> {
        or_log(self.ticker(ticker).calendar().await, ticker, "calendar")
    }

    /// The first `limit` recommendation-trend periods as Yahoo lists them (current month first).
    pub async fn get_recommendations(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Option<Vec<RecommendationRow>> {
        let rows = or_log(self.ticker(ticker).recommendations().await, ticker, "recommendations")?;
        Some(head(rows, limit))
    }

    /// The `limit` most recent upgrades and downgrades, newest first.
    pub async fn get_upgrades_downgrades(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Option<Vec<UpgradeDowngradeRow>> {
        let mut rows = or_log(
            self.ticker(ticker).upgrades_downgrades().await,
            ticker,
            "upgrades/downgrades",
        )?;
        rows.sort_by(|a, b| b.ts.cmp(&a.ts));
        Some(head(rows, limit))
    }

    /// Adjusted daily bars over `period`, or `None` on failure.
    pub async fn get_price_history(&self, ticker: &str, period: Range) -> Option<Vec<Candle>> {
        or_log(self.ticker(ticker).history(period).await, ticker, "price history")
    }

    /// One statement selected by type and frequency, or `None` on failure.
    pub async fn get_financial_statements(
        &self,
        ticker: &str,
        statement_type: StatementType,
        frequency: Frequency,
    ) -> Option<FinancialStatement> {
        or_log(
            self.ticker(ticker)
                .financial_statement(statement_type, frequency)
                .await,
            ticker,
            &format!("{frequency} {statement_type} statement"),
        )
    }

    /// The top `top_n` institutional and mutual fund holders.
    ///
    /// Both lists are fetched concurrently and independently: either half can be `None`
    /// while the other is present.
    pub async fn get_institutional_holders(
        &self,
        ticker: &str,
        top_n: usize,
    ) -> (Option<Vec<InstitutionalHolder>>, Option<Vec<InstitutionalHolder>>) {
        let t = self.ticker(ticker);
        let (institutional, funds) =
            tokio::join!(t.institutional_holders(), t.mutual_fund_holders());
        (
            or_log(institutional, ticker, "institutional holders").map(|v| head(v, top_n)),
            or_log(funds, ticker, "mutual fund holders").map(|v| head(v, top_n)),
        )
    }

    /// The first `limit` quarters of reported versus estimated EPS.
    pub async fn get_earnings_history(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Option<Vec<EarningsHistoryRow>> {
        let history = self.ticker(ticker).earnings_history().await;
        let rows = or_log(history, ticker, "earnings history")?;
        Some(head(rows, limit))
    }

    /// The first `limit` insider transactions, newest first as Yahoo lists them.
    pub async fn get_insider_trades(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Option<Vec<InsiderTransaction>> {
        let trades = self.ticker(ticker).insider_transactions().await;
        let rows = or_log(trades, ticker, "insider trades")?;
        Some(head(rows, limit))
    }

    /// Option contracts for one `YYYY-MM-DD` expiry: calls, puts, or calls followed by puts.
    ///
    /// # Errors
    ///
    /// See [`fetch_chain`].
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_options_chain(
        &self,
        ticker: &str,
        expiry: Option<&str>,
        option_type: Option<OptionType>,
    ) -> Result<Vec<OptionRecord>, OptionsError> {
        fetch_chain(self.session.client(), ticker, expiry, option_type).await
    }

    /// Option contracts across every expiry inside the filter's window, strike-filtered
    /// and sorted by open interest then volume, both descending.
    ///
    /// # Errors
    ///
    /// See [`fetch_filtered`].
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_filtered_options(
        &self,
        ticker: &str,
        filter: &OptionsFilter,
    ) -> Result<Vec<OptionRecord>, OptionsError> {
        fetch_filtered(self.session.client(), ticker, filter, &self.config).await
    }
}

fn or_log<T>(result: Result<T, YfError>, ticker: &str, operation: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::error!(
                ticker,
                operation,
                error = %e,
                "error retrieving {operation} for {ticker}"
            );
            None
        }
    }
}

fn head<T>(mut rows: Vec<T>, limit: usize) -> Vec<T> {
    rows.truncate(limit);
    rows
}
