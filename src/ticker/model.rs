use chrono::NaiveDate;
use serde::Serialize;

/// A single option contract as listed by Yahoo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionContract {
    /// The OCC contract symbol (e.g. `AAPL240119C00150000`).
    pub contract_symbol: String,
    pub strike: f64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: bool,
    /// The expiry date the contract belongs to.
    pub expiration: NaiveDate,
}

/// Calls and puts for one expiry, each side in provider order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OptionChain {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

/// General ticker information flattened from several quoteSummary modules.
///
/// Keys are Yahoo's camelCase field names (`longName`, `sector`, `marketCap`, ...).
/// Numeric fields hold the raw value rather than Yahoo's `{raw, fmt}` wrapper.
pub type Info = serde_json::Map<String, serde_json::Value>;
