use serde::Deserialize;

use crate::core::wire::{RawDate, RawNum};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct V10Result {
    pub(super) calendar_events: Option<CalendarEventsNode>,
    pub(super) earnings_history: Option<EarningsHistoryNode>,
}

/* --- calendar --- */

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CalendarEventsNode {
    pub(super) earnings: Option<CalendarEarningsNode>,
    pub(super) ex_dividend_date: Option<RawDate>,
    pub(super) dividend_date: Option<RawDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CalendarEarningsNode {
    pub(super) earnings_date: Option<Vec<RawDate>>,
    pub(super) earnings_average: Option<RawNum<f64>>,
    pub(super) earnings_low: Option<RawNum<f64>>,
    pub(super) earnings_high: Option<RawNum<f64>>,
    pub(super) revenue_average: Option<RawNum<f64>>,
    pub(super) revenue_low: Option<RawNum<f64>>,
    pub(super) revenue_high: Option<RawNum<f64>>,
}

/* --- earnings history --- */

#[derive(Deserialize)]
pub(super) struct EarningsHistoryNode {
    pub(super) history: Option<Vec<EarningsQuarterNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EarningsQuarterNode {
    pub(super) quarter: Option<RawDate>,
    pub(super) period: Option<String>,
    pub(super) eps_actual: Option<RawNum<f64>>,
    pub(super) eps_estimate: Option<RawNum<f64>>,
    pub(super) eps_difference: Option<RawNum<f64>>,
    pub(super) surprise_percent: Option<RawNum<f64>>,
}
