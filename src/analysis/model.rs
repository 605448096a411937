use serde::Serialize;

/// Analyst rating counts for one period (`0m` is the current month, `-1m` the previous).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRow {
    pub period: String,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

/// A single analyst rating change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeDowngradeRow {
    /// When the grade was published (Unix seconds).
    pub ts: i64,
    pub firm: Option<String>,
    pub from_grade: Option<String>,
    pub to_grade: Option<String>,
    /// Yahoo's action code: `up`, `down`, `main`, `init` or `reit`.
    pub action: Option<String>,
}
