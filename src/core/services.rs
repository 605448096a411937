use std::time::Duration;

use chrono::NaiveDate;

use crate::core::YfError;
use crate::ticker::{OptionChain, Ticker};

/// The future returned by [`OptionsService`] methods.
pub type BoxFut<'a, T> =
    core::pin::Pin<Box<dyn core::future::Future<Output = Result<T, YfError>> + Send + 'a>>;

/// A source of option expiries and per-expiry chains.
///
/// The filtered options fetch in [`crate::agent`] is written against this trait rather
/// than [`YfClient`](crate::YfClient) directly, so the fan-out, merge and sort logic can
/// run over any provider. `YfClient` implements it with the client's default cache mode
/// and retry policy.
pub trait OptionsService: Send + Sync {
    /// All listed expiry dates for `symbol`, in provider order.
    fn expiration_dates<'a>(&'a self, symbol: &'a str) -> BoxFut<'a, Vec<NaiveDate>>;

    /// The calls and puts for `symbol` expiring on `expiry`.
    fn option_chain<'a>(&'a self, symbol: &'a str, expiry: NaiveDate) -> BoxFut<'a, OptionChain>;

    /// Like [`option_chain`](Self::option_chain), failing with [`YfError::Timeout`] when the
    /// chain takes longer than `limit`.
    ///
    /// The default bounds the whole call. Providers that queue requests should override it
    /// so that only the request itself is timed.
    fn option_chain_within<'a>(
        &'a self,
        symbol: &'a str,
        expiry: NaiveDate,
        limit: Duration,
    ) -> BoxFut<'a, OptionChain> {
        Box::pin(async move {
            match tokio::time::timeout(limit, self.option_chain(symbol, expiry)).await {
                Ok(res) => res,
                Err(_) => Err(YfError::Timeout(limit)),
            }
        })
    }
}

impl OptionsService for crate::core::YfClient {
    fn expiration_dates<'a>(&'a self, symbol: &'a str) -> BoxFut<'a, Vec<NaiveDate>> {
        Box::pin(async move { Ticker::new(self, symbol).options().await })
    }

    fn option_chain<'a>(&'a self, symbol: &'a str, expiry: NaiveDate) -> BoxFut<'a, OptionChain> {
        Box::pin(async move { Ticker::new(self, symbol).option_chain(Some(expiry)).await })
    }

    fn option_chain_within<'a>(
        &'a self,
        symbol: &'a str,
        expiry: NaiveDate,
        limit: Duration,
    ) -> BoxFut<'a, OptionChain> {
        Box::pin(async move {
            Ticker::new(self, symbol)
                .options_timeout(Some(limit))
                .option_chain(Some(expiry))
                .await
        })
    }
}
