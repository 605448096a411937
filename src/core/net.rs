use url::Url;

use crate::core::YfError;

/// Reads a successful response body as text, mapping non-2xx statuses to [`YfError::Status`].
pub(crate) async fn get_text(
    resp: reqwest::Response,
    url: &Url,
    endpoint: &str,
    symbol: &str,
) -> Result<String, YfError> {
    let status = resp.status();
    if !status.is_success() {
        tracing::debug!(endpoint, symbol, status = status.as_u16(), "non-success response");
        return Err(YfError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let text = resp.text().await?;
    tracing::trace!(endpoint, symbol, bytes = text.len(), "response body read");
    Ok(text)
}
