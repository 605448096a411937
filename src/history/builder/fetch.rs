use crate::core::client::{CacheMode, RetryConfig};
use crate::core::{Range, YfClient, YfError, net};
use crate::history::wire::{ChartEnvelope, Events, QuoteBlock};

pub(super) struct Fetched {
    pub(super) ts: Vec<i64>,
    pub(super) quote: QuoteBlock,
    pub(super) adjclose: Vec<Option<f64>>,
    pub(super) events: Option<Events>,
}

pub(super) async fn fetch_chart(
    client: &YfClient,
    symbol: &str,
    range: Range,
    include_actions: bool,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Fetched, YfError> {
    let mut url = client.base_chart().join(symbol)?;
    {
        let mut qp = url.query_pairs_mut();
        qp.append_pair("range", range.as_str());
        qp.append_pair("interval", "1d");
        if include_actions {
            qp.append_pair("events", "div|split");
        }
        qp.append_pair("includePrePost", "false");
    }

    if let Some(body) = client.cache_get(&url, cache_mode).await {
        return decode_chart(&body);
    }

    let resp = client
        .send_with_retry(client.http().get(url.clone()), retry_override)
        .await?;
    let body = net::get_text(resp, &url, "history_chart", symbol).await?;

    // Decode before caching so a Yahoo error payload never lands in the cache.
    let fetched = decode_chart(&body)?;
    client.cache_put(&url, &body, cache_mode).await;
    Ok(fetched)
}

fn decode_chart(body: &str) -> Result<Fetched, YfError> {
    let parsed: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| YfError::Data(format!("json parse error: {e}")))?;

    let chart = parsed
        .chart
        .ok_or_else(|| YfError::Data("missing chart".into()))?;

    if let Some(err) = chart.error {
        return Err(YfError::Data(format!(
            "yahoo error: {} - {}",
            err.code, err.description
        )));
    }

    let mut result = chart
        .result
        .ok_or_else(|| YfError::Data("missing result".into()))?;
    if result.is_empty() {
        return Err(YfError::Data("empty result".into()));
    }
    let r0 = result.swap_remove(0);

    let mut indicators = r0.indicators;
    let quote = if indicators.quote.is_empty() {
        return Err(YfError::Data("missing quote".into()));
    } else {
        indicators.quote.swap_remove(0)
    };
    let adjclose = indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    Ok(Fetched {
        ts: r0.stamps.unwrap_or_default(),
        quote,
        adjclose,
        events: r0.events,
    })
}
