use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::core::YfError;

/* ----- HISTORY ----- */

/// One daily bar of price history.
///
/// Prices are split- and dividend-adjusted when Yahoo supplies an adjusted close;
/// `dividend` and `split` carry the corporate action that landed on that day, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    /// Bar start as a Unix timestamp (seconds).
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
    /// Cash dividend paid on this day.
    pub dividend: Option<f64>,
    /// Split ratio (`numerator / denominator`) effective on this day.
    pub split: Option<f64>,
}

/// The look-back windows the history endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Range {
    D1,
    D5,
    #[default]
    M1,
    M3,
    M6,
    Y1,
    Y2,
    Y5,
    Y10,
    Ytd,
    Max,
}

impl Range {
    pub const ALL: [Self; 11] = [
        Self::D1,
        Self::D5,
        Self::M1,
        Self::M3,
        Self::M6,
        Self::Y1,
        Self::Y2,
        Self::Y5,
        Self::Y10,
        Self::Ytd,
        Self::Max,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::D1 => "1d",
            Self::D5 => "5d",
            Self::M1 => "1mo",
            Self::M3 => "3mo",
            Self::M6 => "6mo",
            Self::Y1 => "1y",
            Self::Y2 => "2y",
            Self::Y5 => "5y",
            Self::Y10 => "10y",
            Self::Ytd => "ytd",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Range {
    type Err = YfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| YfError::Config(format!("unknown history period '{s}'")))
    }
}
