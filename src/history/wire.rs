//! Serde mapping for the v8 chart payload. Only the fields the daily history needs.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::core::wire::de_opt_u64;

#[derive(Deserialize)]
pub(super) struct ChartEnvelope {
    pub(super) chart: Option<Chart>,
}

#[derive(Deserialize)]
pub(super) struct Chart {
    pub(super) result: Option<Vec<Series>>,
    pub(super) error: Option<ChartFault>,
}

#[derive(Deserialize)]
pub(super) struct ChartFault {
    pub(super) code: String,
    pub(super) description: String,
}

#[derive(Deserialize)]
pub(super) struct Series {
    #[serde(rename = "timestamp", default)]
    pub(super) stamps: Option<Vec<i64>>,
    pub(super) indicators: Indicators,
    #[serde(default)]
    pub(super) events: Option<Events>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub(super) struct Indicators {
    pub(super) quote: Vec<QuoteBlock>,
    pub(super) adjclose: Vec<AdjClose>,
}

/// Parallel per-bar arrays; `null` marks a bar Yahoo has no value for.
#[derive(Deserialize, Default)]
#[serde(default)]
pub(super) struct QuoteBlock {
    pub(super) open: Vec<Option<f64>>,
    pub(super) high: Vec<Option<f64>>,
    pub(super) low: Vec<Option<f64>>,
    pub(super) close: Vec<Option<f64>>,
    pub(super) volume: Vec<Option<u64>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub(super) struct AdjClose {
    pub(super) adjclose: Vec<Option<f64>>,
}

/// Event maps are keyed by the event's epoch as a string.
#[derive(Deserialize, Default)]
#[serde(default)]
pub(super) struct Events {
    pub(super) dividends: Option<BTreeMap<String, Dividend>>,
    pub(super) splits: Option<BTreeMap<String, Split>>,
}

#[derive(Deserialize)]
pub(super) struct Dividend {
    pub(super) amount: Option<f64>,
    pub(super) date: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Split {
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub(super) numerator: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub(super) denominator: Option<u64>,
    pub(super) split_ratio: Option<String>,
    pub(super) date: Option<i64>,
}
