//! Single-expiry and filtered multi-expiry option chain fetches.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;

use crate::core::{OptionsService, YfError};
use crate::ticker::{OptionChain, OptionContract};

use super::AgentConfig;

/// Which side of a chain to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// The one-letter code (`C` or `P`).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Call => "C",
            Self::Put => "P",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OptionType {
    type Err = YfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "call" | "calls" => Ok(Self::Call),
            "p" | "put" | "puts" => Ok(Self::Put),
            _ => Err(YfError::Config(format!("unknown option type '{s}'"))),
        }
    }
}

/// One option contract tagged with its side and the expiry it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionRecord {
    pub contract_symbol: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: bool,
    /// Serialized as `YYYY-MM-DD`.
    pub expiry_date: NaiveDate,
}

impl OptionRecord {
    fn new(contract: OptionContract, option_type: OptionType, expiry_date: NaiveDate) -> Self {
        Self {
            contract_symbol: contract.contract_symbol,
            option_type,
            strike: contract.strike,
            last_price: contract.last_price,
            bid: contract.bid,
            ask: contract.ask,
            volume: contract.volume,
            open_interest: contract.open_interest,
            implied_volatility: contract.implied_volatility,
            in_the_money: contract.in_the_money,
            expiry_date,
        }
    }
}

/// Why an options request produced no records. `Display` is the caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("No expiry date provided")]
    MissingExpiry,

    /// A date bound that is not `YYYY-MM-DD`; `bound` is `start_date` or `end_date`.
    #[error("Invalid {bound} format. Use YYYY-MM-DD")]
    InvalidDate { bound: &'static str },

    #[error("Invalid expiry '{value}'. Use YYYY-MM-DD")]
    InvalidExpiry { value: String },

    #[error("No options available for {ticker}")]
    NoOptions { ticker: String },

    #[error("No options found for {ticker} within specified date range")]
    NoneInDateRange { ticker: String },

    #[error("No options found for {ticker} matching criteria")]
    NoneMatching { ticker: String },

    /// The chain for a single expiry could not be fetched.
    #[error("{0}")]
    Fetch(String),

    /// Expiry discovery failed.
    #[error("Failed to retrieve options data: {0}")]
    Failed(String),
}

impl OptionsError {
    /// Whether the caller's input was rejected before any request was made.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingExpiry | Self::InvalidDate { .. } | Self::InvalidExpiry { .. }
        )
    }
}

/// Expiry window, strike bounds and side for [`fetch_filtered`]. All bounds are inclusive
/// and every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub strike_lower: Option<f64>,
    pub strike_upper: Option<f64>,
    pub option_type: Option<OptionType>,
}

impl OptionsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep expiries on or after `date` (`YYYY-MM-DD`).
    #[must_use]
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Keep expiries on or before `date` (`YYYY-MM-DD`).
    #[must_use]
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    #[must_use]
    pub const fn strike_lower(mut self, strike: f64) -> Self {
        self.strike_lower = Some(strike);
        self
    }

    #[must_use]
    pub const fn strike_upper(mut self, strike: f64) -> Self {
        self.strike_upper = Some(strike);
        self
    }

    #[must_use]
    pub const fn option_type(mut self, side: OptionType) -> Self {
        self.option_type = Some(side);
        self
    }

    fn admits_strike(&self, strike: f64) -> bool {
        self.strike_lower.is_none_or(|lo| strike >= lo)
            && self.strike_upper.is_none_or(|hi| strike <= hi)
    }
}

/// Strict `YYYY-MM-DD`; surrounding whitespace is rejected.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.trim() != s {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_bound(
    value: Option<&str>,
    bound: &'static str,
) -> Result<Option<NaiveDate>, OptionsError> {
    match value.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or(OptionsError::InvalidDate { bound }),
    }
}

type DateWindow = (Option<NaiveDate>, Option<NaiveDate>);

fn date_window(filter: &OptionsFilter) -> Result<DateWindow, OptionsError> {
    Ok((
        parse_bound(filter.start_date.as_deref(), "start_date")?,
        parse_bound(filter.end_date.as_deref(), "end_date")?,
    ))
}

/// Calls, puts, or calls followed by puts, each side in provider order.
fn select_sides(
    chain: OptionChain,
    side: Option<OptionType>,
    expiry: NaiveDate,
) -> Vec<OptionRecord> {
    let calls = chain
        .calls
        .into_iter()
        .map(|c| OptionRecord::new(c, OptionType::Call, expiry));
    let puts = chain
        .puts
        .into_iter()
        .map(|c| OptionRecord::new(c, OptionType::Put, expiry));

    match side {
        Some(OptionType::Call) => calls.collect(),
        Some(OptionType::Put) => puts.collect(),
        None => calls.chain(puts).collect(),
    }
}

async fn chain_records<S: OptionsService + ?Sized>(
    service: &S,
    ticker: &str,
    expiry: NaiveDate,
    side: Option<OptionType>,
    timeout: Option<Duration>,
) -> Result<Vec<OptionRecord>, YfError> {
    let chain = match timeout {
        Some(limit) => service.option_chain_within(ticker, expiry, limit).await?,
        None => service.option_chain(ticker, expiry).await?,
    };
    Ok(select_sides(chain, side, expiry))
}

/// Fetches one expiry's chain.
///
/// `expiry` must be a `YYYY-MM-DD` date; it is not checked against the listed expiries,
/// so an unlisted date yields whatever Yahoo returns for it (usually nothing).
///
/// # Errors
///
/// [`OptionsError::MissingExpiry`] or [`OptionsError::InvalidExpiry`] before any request;
/// [`OptionsError::Fetch`] if the chain request fails.
pub async fn fetch_chain<S: OptionsService + ?Sized>(
    service: &S,
    ticker: &str,
    expiry: Option<&str>,
    side: Option<OptionType>,
) -> Result<Vec<OptionRecord>, OptionsError> {
    let raw = expiry
        .filter(|s| !s.is_empty())
        .ok_or(OptionsError::MissingExpiry);
    let date = raw.and_then(|s| {
        parse_date(s).ok_or_else(|| OptionsError::InvalidExpiry { value: s.to_string() })
    });
    let date = match date {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!(ticker, error = %e, "rejected options chain request");
            return Err(e);
        }
    };

    chain_records(service, ticker, date, side, None).await.map_err(|e| {
        tracing::error!(ticker, expiry = %date, error = %e, "error retrieving options chain");
        OptionsError::Fetch(e.to_string())
    })
}

/// Fetches every expiry inside the filter's date window concurrently, then merges,
/// strike-filters and sorts by open interest and volume (both descending, missing as 0).
///
/// At most `config.max_concurrency` chains are in flight at once; results are paired with
/// their expiry regardless of completion order. `config.expiry_timeout` bounds each chain
/// request from the moment it is sent, not while it waits on the rate limiter. An expiry
/// that fails or times out is logged at warn level and skipped.
///
/// # Errors
///
/// See [`OptionsError`]. Date bounds are validated before any request is made.
pub async fn fetch_filtered<S: OptionsService + ?Sized>(
    service: &S,
    ticker: &str,
    filter: &OptionsFilter,
    config: &AgentConfig,
) -> Result<Vec<OptionRecord>, OptionsError> {
    let (start, end) = match date_window(filter) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(ticker, error = %e, "rejected filtered options request");
            return Err(e);
        }
    };

    let expiries = service.expiration_dates(ticker).await.map_err(|e| {
        tracing::error!(ticker, error = %e, "error in filtered options fetch");
        OptionsError::Failed(e.to_string())
    })?;
    if expiries.is_empty() {
        return Err(OptionsError::NoOptions { ticker: ticker.to_string() });
    }

    let window: Vec<NaiveDate> = expiries
        .into_iter()
        .filter(|d| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
        .collect();
    if window.is_empty() {
        return Err(OptionsError::NoneInDateRange { ticker: ticker.to_string() });
    }
    tracing::debug!(ticker, expiries = window.len(), "fetching option chains");

    let side = filter.option_type;
    let timeout = config.expiry_timeout;
    let results: Vec<(NaiveDate, Result<Vec<OptionRecord>, YfError>)> = stream::iter(window)
        .map(move |expiry| async move {
            (expiry, chain_records(service, ticker, expiry, side, timeout).await)
        })
        .buffered(config.max_concurrency.max(1))
        .collect()
        .await;

    let mut survivors = 0usize;
    let mut merged = Vec::new();
    for (expiry, outcome) in results {
        match outcome {
            Ok(rows) => {
                survivors += 1;
                merged.extend(rows);
            }
            Err(e) => {
                tracing::warn!(
                    ticker,
                    %expiry,
                    error = %e,
                    "error fetching options for expiry; skipping"
                );
            }
        }
    }
    if survivors == 0 {
        return Err(OptionsError::NoneMatching { ticker: ticker.to_string() });
    }

    merged.retain(|r| filter.admits_strike(r.strike));
    merged.sort_by(|a, b| {
        b.open_interest
            .unwrap_or(0)
            .cmp(&a.open_interest.unwrap_or(0))
            .then_with(|| b.volume.unwrap_or(0).cmp(&a.volume.unwrap_or(0)))
    });

    Ok(merged)
}
