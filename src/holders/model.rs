use serde::Serialize;

/// Represents a single institutional or mutual fund holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionalHolder {
    /// The name of the holding institution or fund.
    pub holder: String,
    /// The number of shares held.
    pub shares: u64,
    /// The date of the last reported position as a Unix timestamp.
    pub date_reported: i64,
    /// The fraction of outstanding shares held (`0.05` is 5%).
    pub pct_held: f64,
    /// The market value of the shares held.
    pub value: u64,
}

/// Represents a single insider transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsiderTransaction {
    /// The insider's name.
    pub insider: String,
    /// The insider's relation to the company (e.g. "Director").
    pub position: String,
    /// Yahoo's free-text description (e.g. "Sale at price 190.00 per share.").
    pub transaction: String,
    pub shares: u64,
    pub value: u64,
    /// Transaction date as a Unix timestamp.
    pub start_date: i64,
    pub ownership: Option<String>,
}
