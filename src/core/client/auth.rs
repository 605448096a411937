//! Cookie & crumb handshake for Yahoo endpoints that reject anonymous calls.
//!
//! The handshake goes through the same rate-limited send path as data requests,
//! so it counts against the session's request budget.

use crate::core::error::YfError;
use reqwest::header::SET_COOKIE;

impl super::YfClient {
    /// Makes sure a crumb is available, running the handshake at most once at a time.
    pub(crate) async fn ensure_credentials(&self) -> Result<(), YfError> {
        if self.state.read().await.crumb.is_some() {
            return Ok(());
        }

        let _guard = self.credential_fetch_lock.lock().await;

        // Another task may have finished the handshake while this one waited.
        if self.state.read().await.crumb.is_some() {
            return Ok(());
        }

        tracing::debug!("acquiring yahoo cookie and crumb");
        let cookie = self.fetch_cookie().await?;
        self.state.write().await.cookie = Some(cookie);

        let crumb = self.fetch_crumb().await?;
        self.state.write().await.crumb = Some(crumb);
        Ok(())
    }

    pub(crate) async fn clear_crumb(&self) {
        self.state.write().await.crumb = None;
    }

    pub(crate) async fn crumb(&self) -> Option<String> {
        self.state.read().await.crumb.clone()
    }

    async fn fetch_cookie(&self) -> Result<String, YfError> {
        let req = self.http.get(self.cookie_url.clone());
        let resp = self.send_with_retry(req, None).await?;

        let cookie = resp
            .headers()
            .get(SET_COOKIE)
            .ok_or_else(|| YfError::Auth(format!("no cookie received from {}", self.cookie_url)))?
            .to_str()
            .map_err(|_| YfError::Auth("invalid cookie header format".into()))?;
        Ok(cookie.to_string())
    }

    async fn fetch_crumb(&self) -> Result<String, YfError> {
        if self.state.read().await.cookie.is_none() {
            return Err(YfError::Auth("cookie is missing, cannot get crumb".into()));
        }

        let req = self.http.get(self.crumb_url.clone());
        let resp = self.send_with_retry(req, None).await?;
        if !resp.status().is_success() {
            return Err(YfError::Auth(format!(
                "crumb endpoint returned status {}",
                resp.status().as_u16()
            )));
        }

        let crumb = resp.text().await?;
        if crumb.is_empty() || crumb.contains('{') || crumb.contains('<') {
            return Err(YfError::Auth(format!("received invalid crumb: {crumb}")));
        }
        Ok(crumb)
    }
}
