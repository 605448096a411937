use serde::Deserialize;

use crate::core::wire::{RawDate, RawNum, RawNumU64};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct V10Result {
    pub(super) institution_ownership: Option<OwnershipNode>,
    pub(super) fund_ownership: Option<OwnershipNode>,
    pub(super) insider_transactions: Option<InsiderTransactionsNode>,
}

#[derive(Deserialize)]
pub(super) struct OwnershipNode {
    #[serde(rename = "ownershipList")]
    pub(super) ownership_list: Option<Vec<InstitutionalHolderNode>>,
}

#[derive(Deserialize)]
pub(super) struct InstitutionalHolderNode {
    pub(super) organization: Option<String>,
    #[serde(rename = "position")]
    pub(super) shares: Option<RawNumU64>,
    #[serde(rename = "reportDate")]
    pub(super) date_reported: Option<RawDate>,
    #[serde(rename = "pctHeld")]
    pub(super) pct_held: Option<RawNum<f64>>,
    pub(super) value: Option<RawNumU64>,
}

#[derive(Deserialize)]
pub(super) struct InsiderTransactionsNode {
    pub(super) transactions: Option<Vec<InsiderTransactionNode>>,
}

#[derive(Deserialize)]
pub(super) struct InsiderTransactionNode {
    #[serde(rename = "filerName")]
    pub(super) insider: Option<String>,
    #[serde(rename = "filerRelation")]
    pub(super) position: Option<String>,
    #[serde(rename = "transactionText")]
    pub(super) transaction: Option<String>,
    pub(super) shares: Option<RawNumU64>,
    pub(super) value: Option<RawNumU64>,
    #[serde(rename = "startDate")]
    pub(super) start_date: Option<RawDate>,
    pub(super) ownership: Option<String>,
}
