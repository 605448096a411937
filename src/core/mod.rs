//! Core components of the `yfinance-agent` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`YfClient`] and its builder (rate limiting, caching, retries).
//! - The primary [`YfError`] type.
//! - Shared data models like [`Candle`] and [`Range`].
//! - Internal networking, caching and authentication logic.

/// Response cache backends (memory and SQLite).
pub(crate) mod cache;
/// The main client (`YfClient`), builder, and configuration.
pub mod client;
/// The primary error type (`YfError`) for the crate.
pub mod error;
/// Shared data models used across multiple API modules.
pub mod models;
pub(crate) mod net;
pub(crate) mod quotesummary;
/// Service traits for abstracting data sources.
pub mod services;
pub(crate) mod wire;

// convenient re-exports so most code can just `use crate::core::YfClient`
pub use client::{CacheMode, RetryConfig, YfClient, YfClientBuilder};
pub use error::YfError;
pub use models::{Candle, Range};
pub use services::{BoxFut, OptionsService};
