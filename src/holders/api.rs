use crate::core::{
    YfClient, YfError,
    client::{CacheMode, RetryConfig},
    quotesummary,
    wire::{from_raw, from_raw_date, from_raw_u64},
};

use super::model::{InsiderTransaction, InstitutionalHolder};
use super::wire::{OwnershipNode, V10Result};

#[derive(Clone, Copy)]
pub(super) enum Ownership {
    Institutional,
    Fund,
}

impl Ownership {
    const fn module(self) -> &'static str {
        match self {
            Self::Institutional => "institutionOwnership",
            Self::Fund => "fundOwnership",
        }
    }
}

async fn fetch_module(
    client: &YfClient,
    symbol: &str,
    module: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<V10Result, YfError> {
    quotesummary::fetch_module_result(client, symbol, module, "holders", cache_mode, retry_override)
        .await
}

pub(super) async fn ownership_list(
    client: &YfClient,
    symbol: &str,
    kind: Ownership,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<InstitutionalHolder>, YfError> {
    let module = kind.module();
    let root = fetch_module(client, symbol, module, cache_mode, retry_override).await?;

    let node: Option<OwnershipNode> = match kind {
        Ownership::Institutional => root.institution_ownership,
        Ownership::Fund => root.fund_ownership,
    };
    let list = node
        .and_then(|n| n.ownership_list)
        .ok_or_else(|| YfError::Data(format!("{module} missing")))?;

    Ok(list
        .into_iter()
        .map(|h| InstitutionalHolder {
            holder: h.organization.unwrap_or_default(),
            shares: from_raw_u64(h.shares).unwrap_or(0),
            date_reported: from_raw_date(h.date_reported).unwrap_or(0),
            pct_held: from_raw(h.pct_held).unwrap_or(0.0),
            value: from_raw_u64(h.value).unwrap_or(0),
        })
        .collect())
}

pub(super) async fn insider_transactions(
    client: &YfClient,
    symbol: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<InsiderTransaction>, YfError> {
    let root =
        fetch_module(client, symbol, "insiderTransactions", cache_mode, retry_override).await?;
    let transactions = root
        .insider_transactions
        .and_then(|it| it.transactions)
        .ok_or_else(|| YfError::Data("insiderTransactions missing".into()))?;

    Ok(transactions
        .into_iter()
        .map(|t| InsiderTransaction {
            insider: t.insider.unwrap_or_default(),
            position: t.position.unwrap_or_default(),
            transaction: t.transaction.unwrap_or_default(),
            shares: from_raw_u64(t.shares).unwrap_or(0),
            value: from_raw_u64(t.value).unwrap_or(0),
            start_date: from_raw_date(t.start_date).unwrap_or(0),
            ownership: t.ownership.filter(|o| !o.is_empty()),
        })
        .collect())
}
