use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use url::Url;

use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
    net,
    wire::de_opt_u64,
};

use super::model::{OptionChain, OptionContract};

/* ---------------- Public: expirations + chain ---------------- */

pub(super) async fn expiration_dates(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
    timeout: Option<Duration>,
) -> Result<Vec<NaiveDate>, YfError> {
    let req = OptionsRequest {
        symbol,
        date: None,
        cache_mode,
        retry_override,
        timeout,
    };
    let node = fetch_options(client, &req).await?;

    Ok(node
        .expiration_dates
        .unwrap_or_default()
        .into_iter()
        .filter_map(epoch_to_date)
        .collect())
}

pub(super) async fn option_chain(
    client: &YfClient,
    symbol: &str,
    expiry: Option<NaiveDate>,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
    timeout: Option<Duration>,
) -> Result<OptionChain, YfError> {
    let date = expiry.map(date_to_epoch);
    let req = OptionsRequest {
        symbol,
        date,
        cache_mode,
        retry_override,
        timeout,
    };
    let node = fetch_options(client, &req).await?;

    let Some(by_date) = node.options.and_then(|mut v| v.pop()) else {
        return Ok(OptionChain::default());
    };

    // Yahoo omits the per-block expiry on some responses; fall back to the requested date.
    let expiration = by_date
        .expiration_date
        .and_then(epoch_to_date)
        .or(expiry)
        .ok_or_else(|| YfError::Data("option chain without expiration date".into()))?;

    // a contract without a strike cannot be placed on the chain
    let map_side = |side: Option<Vec<OptContractNode>>| -> Vec<OptionContract> {
        side.unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.into_contract(expiration))
            .collect()
    };

    Ok(OptionChain {
        calls: map_side(by_date.calls),
        puts: map_side(by_date.puts),
    })
}

/// Expiries are published as midnight-UTC epochs.
fn epoch_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

fn date_to_epoch(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(0, |dt| dt.and_utc().timestamp())
}

/// Decodes a v7 payload, rejecting an `optionChain.error` or an empty result.
fn first_result(body: &str) -> Result<OptResultNode, YfError> {
    let env: OptEnvelope = serde_json::from_str(body)
        .map_err(|e| YfError::Data(format!("options json parse: {e}")))?;
    let chain = env
        .option_chain
        .ok_or_else(|| YfError::Data("missing optionChain".into()))?;

    if let Some(err) = chain.error {
        return Err(YfError::Data(format!(
            "yahoo error: {} - {}",
            err.code.as_deref().unwrap_or("unknown"),
            err.description.as_deref().unwrap_or("unknown")
        )));
    }

    chain
        .result
        .and_then(|mut v| v.pop())
        .ok_or_else(|| YfError::Data("empty options result".into()))
}

/* ---------------- Internal: raw fetch with auth fallback ---------------- */

struct OptionsRequest<'a> {
    symbol: &'a str,
    date: Option<i64>,
    cache_mode: CacheMode,
    retry_override: Option<&'a RetryConfig>,
    timeout: Option<Duration>,
}

impl OptionsRequest<'_> {
    fn get(&self, client: &YfClient, url: &Url) -> reqwest::RequestBuilder {
        let req = client.http().get(url.clone()).header("accept", "application/json");
        match self.timeout {
            Some(limit) => req.timeout(limit),
            None => req,
        }
    }

    fn timed_out(&self, err: YfError) -> YfError {
        match (err, self.timeout) {
            (YfError::Http(e), Some(limit)) if e.is_timeout() => YfError::Timeout(limit),
            (err, _) => err,
        }
    }
}

fn options_url(client: &YfClient, symbol: &str, date: Option<i64>) -> Result<Url, YfError> {
    let mut url = client.base_options().join(symbol)?;
    if let Some(d) = date {
        url.query_pairs_mut().append_pair("date", &d.to_string());
    }
    Ok(url)
}

/// The options endpoint usually answers anonymously; a 401/403 triggers the
/// cookie/crumb handshake and one signed retry. Only bodies that decode to a
/// result are cached.
async fn fetch_options(
    client: &YfClient,
    req: &OptionsRequest<'_>,
) -> Result<OptResultNode, YfError> {
    let url = options_url(client, req.symbol, req.date)?;

    if let Some(body) = client.cache_get(&url, req.cache_mode).await {
        return first_result(&body);
    }

    let body = fetch_body(client, req, &url).await.map_err(|e| req.timed_out(e))?;
    let node = first_result(&body)?;

    client.cache_put(&url, &body, req.cache_mode).await;
    Ok(node)
}

async fn fetch_body(
    client: &YfClient,
    req: &OptionsRequest<'_>,
    url: &Url,
) -> Result<String, YfError> {
    let symbol = req.symbol;
    let resp = client.send_with_retry(req.get(client, url), req.retry_override).await?;

    let code = resp.status().as_u16();
    if code != 401 && code != 403 {
        return net::get_text(resp, url, "options_v7", symbol).await;
    }

    tracing::debug!(symbol, status = code, "options request denied; retrying with crumb");
    client.ensure_credentials().await?;
    let crumb = client.crumb().await.ok_or_else(|| YfError::Status {
        status: code,
        url: url.to_string(),
    })?;

    let mut signed = url.clone();
    signed.query_pairs_mut().append_pair("crumb", &crumb);
    let resp = client.send_with_retry(req.get(client, &signed), req.retry_override).await?;
    net::get_text(resp, &signed, "options_v7", symbol).await
}

/* ---------------- Minimal serde mapping for v7 options ---------------- */

#[derive(Deserialize)]
struct OptEnvelope {
    #[serde(rename = "optionChain")]
    option_chain: Option<OptChainNode>,
}

#[derive(Deserialize)]
struct OptChainNode {
    result: Option<Vec<OptResultNode>>,
    error: Option<OptError>,
}

#[derive(Deserialize)]
struct OptError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct OptResultNode {
    #[serde(rename = "expirationDates")]
    expiration_dates: Option<Vec<i64>>,
    options: Option<Vec<OptByDateNode>>,
}

#[derive(Deserialize)]
struct OptByDateNode {
    #[serde(rename = "expirationDate")]
    expiration_date: Option<i64>,
    calls: Option<Vec<OptContractNode>>,
    puts: Option<Vec<OptContractNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptContractNode {
    contract_symbol: Option<String>,
    strike: Option<f64>,
    last_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    volume: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    open_interest: Option<u64>,
    implied_volatility: Option<f64>,
    in_the_money: Option<bool>,
}

impl OptContractNode {
    fn into_contract(self, expiration: NaiveDate) -> Option<OptionContract> {
        Some(OptionContract {
            contract_symbol: self.contract_symbol.unwrap_or_default(),
            strike: self.strike?,
            last_price: self.last_price,
            bid: self.bid,
            ask: self.ask,
            volume: self.volume,
            open_interest: self.open_interest,
            implied_volatility: self.implied_volatility,
            in_the_money: self.in_the_money.unwrap_or(false),
            expiration,
        })
    }
}
