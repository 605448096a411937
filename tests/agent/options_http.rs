use std::time::{Duration, Instant};

use httpmock::{Method::GET, Mock, MockServer};
use serde_json::{Value, json};
use yfinance_agent::{
    AgentConfig, OptionType, OptionsError, OptionsFilter, SessionConfig, YahooFinanceAgent,
    YahooFinanceSession,
};

use crate::common::{self, contract_json, date, epoch, options_body};

const EXPIRIES: [&str; 3] = ["2024-01-19", "2024-02-16", "2024-03-15"];
const MONTHLIES: [&str; 4] = ["2024-01-19", "2024-02-16", "2024-03-15", "2024-04-19"];

fn mock_discovery(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .is_true(|req| !req.query_params().iter().any(|(k, _)| k == "date"));
        then.status(200)
            .header("content-type", "application/json")
            .body(options_body(&EXPIRIES, None));
    })
}

fn mock_chain<'a>(
    server: &'a MockServer,
    expiry: &str,
    calls: Vec<Value>,
    puts: Vec<Value>,
) -> Mock<'a> {
    let body = options_body(&EXPIRIES, Some((expiry, calls, puts)));
    server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .query_param("date", epoch(expiry).to_string());
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

/// Discovery plus one single-call chain per monthly expiry; `slow` answers after `delay`.
fn mock_monthlies<'a>(server: &'a MockServer, slow: Option<(&str, Duration)>) -> Vec<Mock<'a>> {
    let mut mocks = vec![server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .is_true(|req| !req.query_params().iter().any(|(k, _)| k == "date"));
        then.status(200)
            .header("content-type", "application/json")
            .body(options_body(&MONTHLIES, None));
    })];
    for expiry in MONTHLIES {
        let calls = side(expiry, 'C', &[(100.0, 1, 1)]);
        let body = options_body(&MONTHLIES, Some((expiry, calls, vec![])));
        let delay = slow.filter(|(d, _)| *d == expiry).map_or(Duration::ZERO, |(_, t)| t);
        mocks.push(server.mock(|when, then| {
            when.method(GET)
                .path("/v7/finance/options/AAPL")
                .query_param("date", epoch(expiry).to_string());
            then.status(200)
                .header("content-type", "application/json")
                .delay(delay)
                .body(body);
        }));
    }
    mocks
}

/// An agent whose session really throttles, with a short per-expiry deadline.
fn throttled_agent(server: &MockServer, rps: u32, expiry_timeout: Duration) -> YahooFinanceAgent {
    let session_cfg = SessionConfig {
        requests_per_second: rps,
        cache_name: None,
        ..SessionConfig::default()
    };
    let session =
        YahooFinanceSession::with_builder(common::client_builder(server), &session_cfg).unwrap();
    YahooFinanceAgent::with_session(session).with_config(AgentConfig {
        max_concurrency: 5,
        expiry_timeout: Some(expiry_timeout),
    })
}

fn side(expiry: &str, kind: char, specs: &[(f64, u64, u64)]) -> Vec<Value> {
    let tag = date(expiry).format("%y%m%d");
    specs
        .iter()
        .map(|&(strike, oi, vol)| {
            contract_json(&format!("AAPL{tag}{kind}{strike}"), strike, oi, vol)
        })
        .collect()
}

#[tokio::test]
async fn filtered_fetch_only_requests_expiries_in_window() {
    let server = common::setup_server();
    let discovery = mock_discovery(&server);
    let first_calls = side(EXPIRIES[0], 'C', &[(150.0, 999, 999)]);
    let first = mock_chain(&server, EXPIRIES[0], first_calls, vec![]);
    let second = mock_chain(
        &server,
        EXPIRIES[1],
        side(EXPIRIES[1], 'C', &[(150.0, 10, 5), (160.0, 300, 1)]),
        side(EXPIRIES[1], 'P', &[(140.0, 50, 7)]),
    );
    let third = mock_chain(
        &server,
        EXPIRIES[2],
        side(EXPIRIES[2], 'C', &[(155.0, 300, 9)]),
        side(EXPIRIES[2], 'P', &[(145.0, 0, 0)]),
    );

    let agent = common::test_agent(&server);
    let filter = OptionsFilter::new().start_date("2024-02-01");
    let rows = agent.get_filtered_options("AAPL", &filter).await.unwrap();

    discovery.assert_hits(1);
    first.assert_hits(0);
    second.assert_hits(1);
    third.assert_hits(1);

    let strikes: Vec<f64> = rows.iter().map(|r| r.strike).collect();
    assert_eq!(strikes, vec![155.0, 160.0, 140.0, 150.0, 145.0]);
    assert_eq!(rows[0].expiry_date, date("2024-03-15"));
    assert_eq!(rows[1].expiry_date, date("2024-02-16"));
    assert_eq!(rows[2].option_type, OptionType::Put);
}

#[tokio::test]
async fn warm_cache_answers_a_repeated_query() {
    let server = common::setup_server();
    let discovery = mock_discovery(&server);
    let chains: Vec<Mock<'_>> = EXPIRIES
        .iter()
        .map(|e| {
            let (calls, puts) = (side(e, 'C', &[(100.0, 1, 1)]), side(e, 'P', &[(90.0, 2, 2)]));
            mock_chain(&server, e, calls, puts)
        })
        .collect();

    let agent = common::test_agent(&server);
    let filter = OptionsFilter::new().strike_upper(95.0);
    let cold = agent.get_filtered_options("AAPL", &filter).await.unwrap();
    let warm = agent.get_filtered_options("AAPL", &filter).await.unwrap();

    assert_eq!(cold, warm);
    assert_eq!(cold.len(), 3);
    discovery.assert_hits(1);
    for chain in &chains {
        chain.assert_hits(1);
    }
}

#[tokio::test]
async fn failing_expiry_is_skipped_over_http() {
    let server = common::setup_server();
    mock_discovery(&server);
    mock_chain(&server, EXPIRIES[0], side(EXPIRIES[0], 'C', &[(100.0, 5, 5)]), vec![]);
    let broken = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .query_param("date", epoch(EXPIRIES[1]).to_string());
        then.status(500).body("internal error");
    });
    mock_chain(&server, EXPIRIES[2], side(EXPIRIES[2], 'C', &[(110.0, 7, 7)]), vec![]);

    let agent = common::test_agent(&server);
    let rows = agent
        .get_filtered_options("AAPL", &OptionsFilter::new())
        .await
        .unwrap();

    broken.assert_hits(1);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.expiry_date != date(EXPIRIES[1])));
}

#[tokio::test]
async fn single_chain_over_http() {
    let server = common::setup_server();
    let chain = mock_chain(
        &server,
        EXPIRIES[0],
        side(EXPIRIES[0], 'C', &[(100.0, 1, 1), (105.0, 2, 2)]),
        side(EXPIRIES[0], 'P', &[(95.0, 3, 3)]),
    );

    let agent = common::test_agent(&server);
    let calls = agent
        .get_options_chain("AAPL", Some("2024-01-19"), Some(OptionType::Call))
        .await
        .unwrap();
    let both = agent
        .get_options_chain("AAPL", Some("2024-01-19"), None)
        .await
        .unwrap();

    // second call is served from the cache
    chain.assert_hits(1);
    assert_eq!(calls.len(), 2);
    assert_eq!(both.len(), 3);
    assert_eq!(both[2].option_type, OptionType::Put);
    assert_eq!(both[0].implied_volatility, Some(0.25));
    assert!(both.iter().all(|r| r.expiry_date == date("2024-01-19")));
}

#[tokio::test]
async fn denied_chain_request_is_signed_with_a_crumb() {
    let server = common::setup_server();
    let (cookie, crumb) = common::mock_cookie_crumb(&server);
    let d = epoch(EXPIRIES[0]).to_string();
    let denied = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .query_param("date", d.clone())
            .is_true(|req| !req.query_params().iter().any(|(k, _)| k == "crumb"));
        then.status(403);
    });
    let calls = side(EXPIRIES[0], 'C', &[(100.0, 1, 1)]);
    let body = options_body(&EXPIRIES, Some((EXPIRIES[0], calls, vec![])));
    let signed = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .query_param("date", d.clone())
            .query_param("crumb", "crumb-value");
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    });

    let agent = common::test_agent(&server);
    let rows = agent
        .get_options_chain("AAPL", Some("2024-01-19"), None)
        .await
        .unwrap();

    denied.assert_hits(1);
    cookie.assert_hits(1);
    crumb.assert_hits(1);
    signed.assert_hits(1);
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn discovery_failure_over_http() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/v7/finance/options/AAPL");
        then.status(502);
    });

    let agent = common::test_agent(&server);
    let err = agent
        .get_filtered_options("AAPL", &OptionsFilter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, OptionsError::Failed(_)), "{err:?}");
}

#[tokio::test]
async fn queued_expiries_are_not_timed_out_by_the_rate_limit() {
    let server = common::setup_server();
    let mocks = mock_monthlies(&server, None);
    let agent = throttled_agent(&server, 2, Duration::from_millis(300));

    let started = Instant::now();
    let rows = agent
        .get_filtered_options("AAPL", &OptionsFilter::new())
        .await
        .unwrap();

    // five requests at two per second: the last chain waits well past the deadline
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(rows.len(), MONTHLIES.len());
    for mock in &mocks {
        mock.assert_hits(1);
    }
}

#[tokio::test]
async fn slow_chain_over_http_times_out_and_is_skipped() {
    let (logs, _guard) = common::capture_logs();
    let server = common::setup_server();
    let slow = MONTHLIES[1];
    mock_monthlies(&server, Some((slow, Duration::from_secs(3))));
    let agent = throttled_agent(&server, 2, Duration::from_millis(400));

    let rows = agent
        .get_filtered_options("AAPL", &OptionsFilter::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), MONTHLIES.len() - 1);
    assert!(rows.iter().all(|r| r.expiry_date != date(slow)));
    let out = logs.contents();
    assert!(out.contains("timed out"), "{out}");
    assert!(out.contains(slow), "{out}");
}

#[tokio::test]
async fn contracts_without_a_strike_are_dropped() {
    let server = common::setup_server();
    mock_discovery(&server);
    let mut no_strike = contract_json("AAPL240119C_", 0.0, 900, 900);
    if let Some(obj) = no_strike.as_object_mut() {
        obj.remove("strike");
    }
    let mut null_strike = contract_json("AAPL240119P_", 0.0, 800, 800);
    null_strike["strike"] = json!(null);
    mock_chain(
        &server,
        EXPIRIES[0],
        vec![no_strike, contract_json("AAPL240119C100", 100.0, 1, 1)],
        vec![null_strike],
    );

    let agent = common::test_agent(&server);
    let filter = OptionsFilter::new().end_date("2024-01-31").strike_upper(150.0);
    let filtered = agent.get_filtered_options("AAPL", &filter).await.unwrap();
    let chain = agent
        .get_options_chain("AAPL", Some("2024-01-19"), None)
        .await
        .unwrap();

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].strike, 100.0);
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].contract_symbol, "AAPL240119C100");
}
