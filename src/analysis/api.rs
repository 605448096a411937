use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
    quotesummary,
};

use super::model::{RecommendationRow, UpgradeDowngradeRow};
use super::wire::V10Result;

fn count(v: Option<i64>) -> u32 {
    v.and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

pub(super) async fn recommendation_trend(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<RecommendationRow>, YfError> {
    let root: V10Result = quotesummary::fetch_module_result(
        client,
        symbol,
        "recommendationTrend",
        "analysis",
        cache_mode,
        retry_override,
    )
    .await?;

    let trend = root
        .recommendation_trend
        .and_then(|x| x.trend)
        .ok_or_else(|| YfError::Data("recommendationTrend missing".into()))?;

    Ok(trend
        .into_iter()
        .map(|n| RecommendationRow {
            period: n.period.unwrap_or_default(),
            strong_buy: count(n.strong_buy),
            buy: count(n.buy),
            hold: count(n.hold),
            sell: count(n.sell),
            strong_sell: count(n.strong_sell),
        })
        .collect())
}

pub(super) async fn upgrades_downgrades(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<UpgradeDowngradeRow>, YfError> {
    let root: V10Result = quotesummary::fetch_module_result(
        client,
        symbol,
        "upgradeDowngradeHistory",
        "analysis",
        cache_mode,
        retry_override,
    )
    .await?;

    let history = root
        .upgrade_downgrade_history
        .and_then(|x| x.history)
        .ok_or_else(|| YfError::Data("upgradeDowngradeHistory missing".into()))?;

    Ok(history
        .into_iter()
        .map(|h| UpgradeDowngradeRow {
            ts: h.epoch_grade_date.unwrap_or(0),
            firm: non_empty(h.firm),
            from_grade: non_empty(h.from_grade),
            to_grade: non_empty(h.to_grade),
            action: non_empty(h.action),
        })
        .collect())
}
