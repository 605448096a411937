//! yfinance-agent: a rate-limited, cached Yahoo Finance client and data access facade.
//!
//! The upstream layer ([`Ticker`] and the per-area builders) maps Yahoo's chart,
//! quoteSummary and options endpoints to typed results. [`YahooFinanceAgent`] sits on
//! top: it shares one [`YahooFinanceSession`] across every call, turns failures into
//! logged `None`s, and fetches option chains for many expiries concurrently.

pub mod agent;
pub mod analysis;
pub mod core;
pub mod fundamentals;
pub mod history;
pub mod holders;
pub mod ticker;

pub use agent::{
    AgentConfig, DEFAULT_EARNINGS_LIMIT, DEFAULT_HOLDERS_TOP_N, DEFAULT_INSIDER_LIMIT,
    DEFAULT_RECOMMENDATIONS_LIMIT, DEFAULT_UPGRADES_LIMIT, OptionRecord, OptionType, OptionsError,
    OptionsFilter, SessionConfig, YahooFinanceAgent, YahooFinanceSession,
};
pub use analysis::{AnalysisBuilder, RecommendationRow, UpgradeDowngradeRow};
pub use core::{
    CacheMode, Candle, OptionsService, Range, RetryConfig, YfClient, YfClientBuilder, YfError,
};
pub use fundamentals::{
    Calendar, EarningsHistoryRow, FinancialStatement, Frequency, FundamentalsBuilder,
    StatementRow, StatementType,
};
pub use history::HistoryBuilder;
pub use holders::{HoldersBuilder, InsiderTransaction, InstitutionalHolder};
pub use ticker::{Info, OptionChain, OptionContract, Ticker};
