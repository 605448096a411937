use tracing_subscriber::EnvFilter;
use yfinance_agent::{
    DEFAULT_UPGRADES_LIMIT, Frequency, OptionType, OptionsFilter, Range, SessionConfig,
    StatementType, YahooFinanceAgent, YahooFinanceSession,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=yfinance_agent=debug shows cache hits and limiter waits.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. One session, shared by every call the agent makes.
    let session = YahooFinanceSession::new(SessionConfig::default())?;
    let agent = YahooFinanceAgent::new(Some(session))?;

    // 2. Plain accessors return None (and log) on failure.
    if let Some(info) = agent.get_ticker_info("AAPL").await {
        println!("--- Ticker info for AAPL ---");
        for key in ["longName", "sector", "marketCap", "currentPrice"] {
            if let Some(v) = info.get(key) {
                println!("{key}: {v}");
            }
        }
        println!();
    }

    if let Some(bars) = agent.get_price_history("AAPL", Range::M1).await {
        println!("--- Last 5 daily bars ---");
        for c in bars.iter().rev().take(5) {
            println!("{} close={:.2} volume={:?}", c.ts, c.close, c.volume);
        }
        println!();
    }

    if let Some(stmt) = agent
        .get_financial_statements("AAPL", StatementType::Income, Frequency::Quarterly)
        .await
        && let Some(latest) = stmt.rows.first()
    {
        println!("--- Latest quarterly income statement ---");
        for (item, value) in &latest.items {
            println!("{item}: {value}");
        }
        println!();
    }

    if let Some(rows) = agent.get_upgrades_downgrades("AAPL", DEFAULT_UPGRADES_LIMIT).await {
        println!("--- Recent rating changes ---");
        for r in rows {
            println!(
                "{} {} -> {} ({})",
                r.firm.unwrap_or_default(),
                r.from_grade.unwrap_or_default(),
                r.to_grade.unwrap_or_default(),
                r.action.unwrap_or_default()
            );
        }
        println!();
    }

    // 3. Options flows explain an empty outcome.
    let filter = OptionsFilter::new()
        .strike_lower(150.0)
        .strike_upper(250.0)
        .option_type(OptionType::Call);
    match agent.get_filtered_options("AAPL", &filter).await {
        Ok(rows) => {
            println!("--- Most active AAPL calls between 150 and 250 ---");
            for r in rows.iter().take(10) {
                println!(
                    "{} {} strike={} oi={:?} vol={:?}",
                    r.expiry_date, r.contract_symbol, r.strike, r.open_interest, r.volume
                );
            }
        }
        Err(e) => println!("options: {e}"),
    }

    Ok(())
}
