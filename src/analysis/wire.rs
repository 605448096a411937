use serde::Deserialize;

#[derive(Deserialize)]
pub(super) struct V10Result {
    #[serde(rename = "recommendationTrend")]
    pub(super) recommendation_trend: Option<RecommendationTrendNode>,

    #[serde(rename = "upgradeDowngradeHistory")]
    pub(super) upgrade_downgrade_history: Option<UpgradeDowngradeHistoryNode>,
}

/* --- recommendation trend --- */

#[derive(Deserialize)]
pub(super) struct RecommendationTrendNode {
    pub(super) trend: Option<Vec<RecommendationNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecommendationNode {
    pub(super) period: Option<String>,
    pub(super) strong_buy: Option<i64>,
    pub(super) buy: Option<i64>,
    pub(super) hold: Option<i64>,
    pub(super) sell: Option<i64>,
    pub(super) strong_sell: Option<i64>,
}

/* --- upgrades / downgrades --- */

#[derive(Deserialize)]
pub(super) struct UpgradeDowngradeHistoryNode {
    pub(super) history: Option<Vec<UpgradeNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpgradeNode {
    pub(super) epoch_grade_date: Option<i64>,
    pub(super) firm: Option<String>,
    pub(super) to_grade: Option<String>,
    pub(super) from_grade: Option<String>,
    pub(super) action: Option<String>,
}
