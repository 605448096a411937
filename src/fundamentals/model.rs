use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::YfError;

/// Which financial statement to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum StatementType {
    #[default]
    Income,
    Balance,
    Cash,
}

impl StatementType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Balance => "balance",
            Self::Cash => "cash",
        }
    }

    /// The quoteSummary module holding this statement.
    pub(crate) const fn module(self, frequency: Frequency) -> &'static str {
        match (self, frequency) {
            (Self::Income, Frequency::Annual) => "incomeStatementHistory",
            (Self::Income, Frequency::Quarterly) => "incomeStatementHistoryQuarterly",
            (Self::Balance, Frequency::Annual) => "balanceSheetHistory",
            (Self::Balance, Frequency::Quarterly) => "balanceSheetHistoryQuarterly",
            (Self::Cash, Frequency::Annual) => "cashflowStatementHistory",
            (Self::Cash, Frequency::Quarterly) => "cashflowStatementHistoryQuarterly",
        }
    }

    /// The array of periods inside the module object.
    pub(crate) const fn rows_key(self) -> &'static str {
        match self {
            Self::Income => "incomeStatementHistory",
            Self::Balance => "balanceSheetStatements",
            Self::Cash => "cashflowStatements",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = YfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "balance" => Ok(Self::Balance),
            "cash" | "cashflow" => Ok(Self::Cash),
            _ => Err(YfError::Config(format!("unknown statement type '{s}'"))),
        }
    }
}

/// Reporting frequency of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Frequency {
    #[default]
    Quarterly,
    Annual,
}

impl Frequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = YfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(YfError::Config(format!("unknown statement frequency '{s}'"))),
        }
    }
}

/// One reporting period of a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRow {
    /// Period end as a Unix timestamp.
    pub period_end: i64,
    /// Line items by Yahoo field name (`totalRevenue`, `netIncome`, ...).
    pub items: BTreeMap<String, f64>,
}

/// A financial statement, most recent period first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialStatement {
    pub statement_type: StatementType,
    pub frequency: Frequency,
    pub rows: Vec<StatementRow>,
}

/// Upcoming corporate events and the analyst estimates around the next report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Calendar {
    /// Candidate dates for the next earnings release (Unix timestamps).
    pub earnings_dates: Vec<i64>,
    pub earnings_average: Option<f64>,
    pub earnings_low: Option<f64>,
    pub earnings_high: Option<f64>,
    pub revenue_average: Option<f64>,
    pub revenue_low: Option<f64>,
    pub revenue_high: Option<f64>,
    pub ex_dividend_date: Option<i64>,
    pub dividend_date: Option<i64>,
}

/// Reported versus estimated EPS for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsHistoryRow {
    /// Quarter end as a Unix timestamp.
    pub quarter: Option<i64>,
    /// Relative period label (`-1q` is the last reported quarter).
    pub period: Option<String>,
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub eps_difference: Option<f64>,
    pub surprise_percent: Option<f64>,
}
