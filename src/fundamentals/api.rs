use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
    quotesummary,
    wire::{from_raw, from_raw_date},
};

use super::model::{
    Calendar, EarningsHistoryRow, FinancialStatement, Frequency, StatementRow, StatementType,
};
use super::wire::V10Result;

pub(super) async fn statement(
    client: &YfClient,
    symbol: &str,
    kind: StatementType,
    frequency: Frequency,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<FinancialStatement, YfError> {
    let module = kind.module(frequency);
    let mut result = quotesummary::fetch_first_result(
        client,
        symbol,
        module,
        "fundamentals",
        cache_mode,
        retry_override,
    )
    .await?;

    let periods = match result.get_mut(module).and_then(|m| m.get_mut(kind.rows_key())) {
        Some(Value::Array(list)) => std::mem::take(list),
        _ => return Err(YfError::Data(format!("{module} missing"))),
    };

    let rows = periods.iter().filter_map(statement_row).collect();

    Ok(FinancialStatement {
        statement_type: kind,
        frequency,
        rows,
    })
}

/// Statement periods are flat objects of `{raw, fmt}` line items plus an `endDate`.
fn statement_row(period: &Value) -> Option<StatementRow> {
    let fields = period.as_object()?;
    let period_end = fields.get("endDate")?.get("raw")?.as_i64()?;

    let items: BTreeMap<String, f64> = fields
        .iter()
        .filter(|(key, _)| key.as_str() != "endDate" && key.as_str() != "maxAge")
        .filter_map(|(key, v)| Some((key.clone(), v.get("raw")?.as_f64()?)))
        .collect();

    Some(StatementRow { period_end, items })
}

pub(super) async fn calendar(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Calendar, YfError> {
    let root: V10Result = quotesummary::fetch_module_result(
        client,
        symbol,
        "calendarEvents",
        "fundamentals",
        cache_mode,
        retry_override,
    )
    .await?;
    let events = root
        .calendar_events
        .ok_or_else(|| YfError::Data("calendarEvents missing".into()))?;

    let mut cal = Calendar {
        ex_dividend_date: from_raw_date(events.ex_dividend_date),
        dividend_date: from_raw_date(events.dividend_date),
        ..Calendar::default()
    };

    if let Some(e) = events.earnings {
        cal.earnings_dates = e
            .earnings_date
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| d.raw)
            .collect();
        cal.earnings_average = from_raw(e.earnings_average);
        cal.earnings_low = from_raw(e.earnings_low);
        cal.earnings_high = from_raw(e.earnings_high);
        cal.revenue_average = from_raw(e.revenue_average);
        cal.revenue_low = from_raw(e.revenue_low);
        cal.revenue_high = from_raw(e.revenue_high);
    }

    Ok(cal)
}

pub(super) async fn earnings_history(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<EarningsHistoryRow>, YfError> {
    let root: V10Result = quotesummary::fetch_module_result(
        client,
        symbol,
        "earningsHistory",
        "fundamentals",
        cache_mode,
        retry_override,
    )
    .await?;
    let history = root
        .earnings_history
        .and_then(|h| h.history)
        .ok_or_else(|| YfError::Data("earningsHistory missing".into()))?;

    Ok(history
        .into_iter()
        .map(|q| EarningsHistoryRow {
            quarter: from_raw_date(q.quarter),
            period: q.period,
            eps_actual: from_raw(q.eps_actual),
            eps_estimate: from_raw(q.eps_estimate),
            eps_difference: from_raw(q.eps_difference),
            surprise_percent: from_raw(q.surprise_percent),
        })
        .collect())
}
