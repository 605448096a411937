#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use httpmock::{Method::GET, Mock, MockServer};
use serde_json::{Value, json};
use tracing_subscriber::fmt::MakeWriter;
use url::Url;
use yfinance_agent::{
    OptionChain, OptionContract, SessionConfig, YahooFinanceAgent, YahooFinanceSession,
    YfClientBuilder,
};

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn mock_cookie_crumb(server: &'_ MockServer) -> (Mock<'_>, Mock<'_>) {
    let cookie_mock = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200).header(
            "set-cookie",
            "A=B; Max-Age=315360000; Domain=.yahoo.com; Path=/; Secure; SameSite=None",
        );
    });
    let crumb_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200).body("crumb-value");
    });
    (cookie_mock, crumb_mock)
}

/// A client builder with every Yahoo endpoint pointed at `server`.
pub fn client_builder(server: &MockServer) -> YfClientBuilder {
    let base = server.base_url();
    yfinance_agent::YfClient::builder()
        .base_chart(Url::parse(&format!("{base}/v8/finance/chart/")).unwrap())
        .base_quote_api(Url::parse(&format!("{base}/v10/finance/quoteSummary/")).unwrap())
        .base_options(Url::parse(&format!("{base}/v7/finance/options/")).unwrap())
        .cookie_url(Url::parse(&format!("{base}/consent")).unwrap())
        .crumb_url(Url::parse(&format!("{base}/v1/test/getcrumb")).unwrap())
}

/// An agent on an in-memory cached session against `server`, fast enough not to throttle tests.
pub fn test_agent(server: &MockServer) -> YahooFinanceAgent {
    let config = SessionConfig {
        requests_per_second: 100,
        cache_name: None,
        ..SessionConfig::default()
    };
    let session = YahooFinanceSession::with_builder(client_builder(server), &config).unwrap();
    YahooFinanceAgent::with_session(session)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn epoch(s: &str) -> i64 {
    date(s).and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp()
}

/* ---------------- inline payloads ---------------- */

/// A quoteSummary envelope holding one result object made of `modules`.
pub fn quote_summary_body(modules: Value) -> String {
    json!({ "quoteSummary": { "result": [modules], "error": null } }).to_string()
}

pub fn quote_summary_error(description: &str) -> String {
    json!({ "quoteSummary": { "result": null, "error": { "code": "Not Found", "description": description } } })
        .to_string()
}

pub fn raw(v: f64) -> Value {
    json!({ "raw": v, "fmt": v.to_string() })
}

/// One v7 contract node.
pub fn contract_json(symbol: &str, strike: f64, open_interest: u64, volume: u64) -> Value {
    json!({
        "contractSymbol": symbol,
        "strike": strike,
        "lastPrice": 1.5,
        "bid": 1.4,
        "ask": 1.6,
        "volume": volume,
        "openInterest": open_interest,
        "impliedVolatility": 0.25,
        "inTheMoney": false
    })
}

/// A v7 options payload listing `expiries`; `chain` is `(expiry, calls, puts)`.
pub fn options_body(expiries: &[&str], chain: Option<(&str, Vec<Value>, Vec<Value>)>) -> String {
    let dates: Vec<i64> = expiries.iter().map(|d| epoch(d)).collect();
    let options = match chain {
        Some((exp, calls, puts)) => json!([{ "expirationDate": epoch(exp), "calls": calls, "puts": puts }]),
        None => json!([]),
    };
    json!({
        "optionChain": {
            "result": [{ "underlyingSymbol": "AAPL", "expirationDates": dates, "options": options }],
            "error": null
        }
    })
    .to_string()
}

/// A one-row-per-day chart payload.
pub fn chart_body(ts: &[i64], close: &[f64], adjclose: &[f64]) -> String {
    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL" },
                "timestamp": ts,
                "indicators": {
                    "quote": [{
                        "open": close,
                        "high": close,
                        "low": close,
                        "close": close,
                        "volume": vec![1000u64; ts.len()]
                    }],
                    "adjclose": [{ "adjclose": adjclose }]
                }
            }],
            "error": null
        }
    })
    .to_string()
}

/* ---------------- in-memory chains ---------------- */

pub fn contract(
    symbol: &str,
    strike: f64,
    open_interest: Option<u64>,
    volume: Option<u64>,
    expiry: NaiveDate,
) -> OptionContract {
    OptionContract {
        contract_symbol: symbol.to_string(),
        strike,
        last_price: Some(1.0),
        bid: Some(0.9),
        ask: Some(1.1),
        volume,
        open_interest,
        implied_volatility: Some(0.3),
        in_the_money: false,
        expiration: expiry,
    }
}

/// `n` calls and `n` puts with strikes 100, 105, ... and open interest rising with the index.
pub fn chain_of(expiry: NaiveDate, n: usize) -> OptionChain {
    let side = |kind: char| {
        (0..n)
            .map(|i| {
                let strike = 100.0 + 5.0 * i as f64;
                contract(
                    &format!("AAPL{}{kind}{i}", expiry.format("%y%m%d")),
                    strike,
                    Some((i as u64 + 1) * 10),
                    Some(i as u64),
                    expiry,
                )
            })
            .collect::<Vec<_>>()
    };
    OptionChain {
        calls: side('C'),
        puts: side('P'),
    }
}

/* ---------------- log capture ---------------- */

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes this thread's `tracing` events into a buffer until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buf = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buf, guard)
}
