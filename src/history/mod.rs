//! Daily price history from the v8 chart endpoint.

mod builder;
mod wire;

pub use builder::HistoryBuilder;
