use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
    net,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct V10Envelope {
    #[serde(rename = "quoteSummary")]
    pub(crate) quote_summary: Option<V10QuoteSummary>,
}

#[derive(Deserialize)]
pub struct V10QuoteSummary {
    pub(crate) result: Option<Vec<serde_json::Value>>,
    pub(crate) error: Option<V10Error>,
}

#[derive(Deserialize)]
pub struct V10Error {
    pub(crate) description: String,
}

enum Attempt {
    Done(V10Envelope),
    StaleCrumb,
}

/// Fetches the given quoteSummary `modules` for `symbol`.
///
/// The cache is checked before any handshake so a warm cache costs no requests.
/// A Yahoo "invalid crumb" error clears the crumb and retries once with a fresh one;
/// only error-free bodies are written to the cache.
pub async fn fetch(
    client: &YfClient,
    symbol: &str,
    modules: &str,
    caller: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<V10Envelope, YfError> {
    let mut url = client.base_quote_api().join(symbol)?;
    url.query_pairs_mut().append_pair("modules", modules);

    if let Some(text) = client.cache_get(&url, cache_mode).await {
        return Ok(serde_json::from_str(&text)?);
    }

    for attempt in 0..=1 {
        match attempt_fetch(client, &url, symbol, caller, cache_mode, retry_override).await? {
            Attempt::Done(env) => return Ok(env),
            Attempt::StaleCrumb if attempt == 0 => {
                tracing::debug!(caller, symbol, "invalid crumb; refreshing and retrying");
                client.clear_crumb().await;
            }
            Attempt::StaleCrumb => break,
        }
    }

    Err(YfError::Data(format!("{caller} API call failed after crumb refresh")))
}

async fn attempt_fetch(
    client: &YfClient,
    url: &url::Url,
    symbol: &str,
    caller: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Attempt, YfError> {
    client.ensure_credentials().await?;
    let crumb = client
        .crumb()
        .await
        .ok_or_else(|| YfError::Auth("crumb is not set".into()))?;

    let mut signed = url.clone();
    signed.query_pairs_mut().append_pair("crumb", &crumb);

    let resp = client
        .send_with_retry(client.http().get(signed.clone()), retry_override)
        .await?;
    let text = net::get_text(resp, &signed, caller, symbol).await?;
    let env: V10Envelope = serde_json::from_str(&text)?;

    if let Some(error) = env.quote_summary.as_ref().and_then(|qs| qs.error.as_ref()) {
        if error.description.to_ascii_lowercase().contains("invalid crumb") {
            return Ok(Attempt::StaleCrumb);
        }
        return Err(YfError::Data(format!("yahoo error: {}", error.description)));
    }

    client.cache_put(url, &text, cache_mode).await;
    Ok(Attempt::Done(env))
}

/// Fetches `modules` and returns the first result object as raw JSON.
pub async fn fetch_first_result(
    client: &YfClient,
    symbol: &str,
    modules: &str,
    caller: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<serde_json::Value, YfError> {
    let env = fetch(client, symbol, modules, caller, cache_mode, retry_override).await?;

    env.quote_summary
        .and_then(|qs| qs.result)
        .and_then(|mut v| v.pop())
        .ok_or_else(|| YfError::Data("empty quoteSummary result".into()))
}

/// Fetches `modules` and decodes the first result object into `T`.
pub async fn fetch_module_result<T>(
    client: &YfClient,
    symbol: &str,
    modules: &str,
    caller: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<T, YfError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let result_val =
        fetch_first_result(client, symbol, modules, caller, cache_mode, retry_override).await?;

    serde_json::from_value(result_val)
        .map_err(|e| YfError::Data(format!("quoteSummary result parse: {e}")))
}
