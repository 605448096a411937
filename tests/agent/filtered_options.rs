use std::collections::BTreeMap;
use std::time::Duration;

use yfinance_agent::agent::fetch_filtered;
use yfinance_agent::{AgentConfig, OptionChain, OptionType, OptionsError, OptionsFilter};

use crate::common::{self, chain_of, contract, date};
use crate::fake::FakeOptions;

fn config() -> AgentConfig {
    AgentConfig::default()
}

fn three_expiries() -> FakeOptions {
    let (a, b, c) = (date("2024-01-19"), date("2024-02-16"), date("2024-03-15"));
    FakeOptions::new(&[a, b, c])
        .with_chain(a, chain_of(a, 5))
        .with_chain(b, chain_of(b, 5))
        .with_chain(c, chain_of(c, 5))
}

fn assert_sorted(rows: &[yfinance_agent::OptionRecord]) {
    for pair in rows.windows(2) {
        let (x, y) = (&pair[0], &pair[1]);
        let (xo, yo) = (x.open_interest.unwrap_or(0), y.open_interest.unwrap_or(0));
        assert!(xo >= yo, "open interest not descending: {xo} before {yo}");
        if xo == yo {
            assert!(
                x.volume.unwrap_or(0) >= y.volume.unwrap_or(0),
                "volume not descending within equal open interest"
            );
        }
    }
}

#[tokio::test]
async fn malformed_start_date_is_rejected_before_any_request() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().start_date("2024/01/01");

    let err = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap_err();

    assert_eq!(err, OptionsError::InvalidDate { bound: "start_date" });
    assert_eq!(err.to_string(), "Invalid start_date format. Use YYYY-MM-DD");
    assert!(err.is_validation());
    assert_eq!(svc.total_calls(), 0);
}

#[tokio::test]
async fn malformed_end_date_is_rejected_before_any_request() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().start_date("2024-01-01").end_date("2024-13-01");

    let err = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid end_date format. Use YYYY-MM-DD");
    assert_eq!(svc.total_calls(), 0);
}

#[tokio::test]
async fn padded_date_bounds_are_rejected() {
    let svc = three_expiries();

    let leading = OptionsFilter::new().start_date(" 2024-01-01");
    let err = fetch_filtered(&svc, "AAPL", &leading, &config()).await.unwrap_err();
    assert_eq!(err, OptionsError::InvalidDate { bound: "start_date" });

    let trailing = OptionsFilter::new().end_date("2024-03-31\n");
    let err = fetch_filtered(&svc, "AAPL", &trailing, &config()).await.unwrap_err();
    assert_eq!(err, OptionsError::InvalidDate { bound: "end_date" });

    assert_eq!(svc.total_calls(), 0);
}

#[tokio::test]
async fn empty_date_bound_means_unbounded() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().start_date("").end_date("");

    let rows = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap();

    assert_eq!(rows.len(), 30);
}

#[tokio::test]
async fn validation_errors_are_not_logged_as_errors() {
    let (logs, _guard) = common::capture_logs();
    let svc = three_expiries();
    let filter = OptionsFilter::new().end_date("tomorrow");

    let _ = fetch_filtered(&svc, "AAPL", &filter, &config()).await;

    let out = logs.contents();
    assert!(!out.contains("ERROR"), "unexpected error log: {out}");
}

#[tokio::test]
async fn no_listed_expiries() {
    let svc = FakeOptions::new(&[]);

    let err = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "No options available for AAPL");
    assert!(svc.chain_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_date_window_fetches_no_chains() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().start_date("2030-01-01");

    let err = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "No options found for AAPL within specified date range"
    );
    assert!(svc.chain_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn date_window_bounds_are_inclusive() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().start_date("2024-02-16").end_date("2024-03-15");

    let rows = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap();

    let mut fetched = svc.chain_calls.lock().unwrap().clone();
    fetched.sort();
    assert_eq!(fetched, vec![date("2024-02-16"), date("2024-03-15")]);
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| r.expiry_date >= date("2024-02-16")));
}

#[tokio::test]
async fn three_expiries_of_five_calls_and_five_puts_give_thirty_tagged_rows() {
    let svc = three_expiries();

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap();

    assert_eq!(rows.len(), 30);
    assert_sorted(&rows);

    let mut per_expiry: BTreeMap<_, (usize, usize)> = BTreeMap::new();
    for r in &rows {
        let entry = per_expiry.entry(r.expiry_date).or_default();
        match r.option_type {
            OptionType::Call => entry.0 += 1,
            OptionType::Put => entry.1 += 1,
        }
        let tag = r.expiry_date.format("%y%m%d").to_string();
        assert!(r.contract_symbol.contains(&tag), "{} tagged {}", r.contract_symbol, r.expiry_date);
    }
    assert_eq!(per_expiry.len(), 3);
    assert!(per_expiry.values().all(|&(c, p)| c == 5 && p == 5));
}

#[tokio::test]
async fn failed_expiry_is_skipped_and_warned() {
    let (logs, _guard) = common::capture_logs();
    let (a, b, c) = (date("2024-01-19"), date("2024-02-16"), date("2024-03-15"));
    let svc = FakeOptions::new(&[a, b, c])
        .with_chain(a, chain_of(a, 5))
        .with_failure(b, "upstream exploded")
        .with_chain(c, chain_of(c, 5));

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap();

    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| r.expiry_date != b));

    let out = logs.contents();
    let warn_line = out
        .lines()
        .find(|l| l.contains("WARN"))
        .unwrap_or_else(|| panic!("no warning logged: {out}"));
    assert!(warn_line.contains("2024-02-16"), "{warn_line}");
    assert!(warn_line.contains("upstream exploded"), "{warn_line}");
}

#[tokio::test]
async fn every_expiry_failing_means_nothing_matched() {
    let (a, b) = (date("2024-01-19"), date("2024-02-16"));
    let svc = FakeOptions::new(&[a, b])
        .with_failure(a, "down")
        .with_failure(b, "down");

    let err = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap_err();

    assert_eq!(err, OptionsError::NoneMatching { ticker: "AAPL".into() });
    assert_eq!(err.to_string(), "No options found for AAPL matching criteria");
}

#[tokio::test]
async fn empty_chains_are_a_successful_empty_result() {
    let a = date("2024-01-19");
    let svc = FakeOptions::new(&[a]).with_chain(a, OptionChain::default());

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn strike_bounds_are_inclusive() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().strike_lower(105.0).strike_upper(115.0);

    let rows = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap();

    // strikes 105, 110, 115 on both sides of three expiries
    assert_eq!(rows.len(), 18);
    assert!(rows.iter().all(|r| (105.0..=115.0).contains(&r.strike)));
    assert!(rows.iter().any(|r| r.strike == 105.0));
    assert!(rows.iter().any(|r| r.strike == 115.0));
    assert_sorted(&rows);
}

#[tokio::test]
async fn option_type_selects_one_side() {
    let svc = three_expiries();
    let filter = OptionsFilter::new().option_type(OptionType::Put);

    let rows = fetch_filtered(&svc, "AAPL", &filter, &config()).await.unwrap();

    assert_eq!(rows.len(), 15);
    assert!(rows.iter().all(|r| r.option_type == OptionType::Put));
}

#[tokio::test]
async fn missing_open_interest_and_volume_sort_as_zero() {
    let a = date("2024-01-19");
    let chain = OptionChain {
        calls: vec![
            contract("NONE", 100.0, None, None, a),
            contract("LOW", 105.0, Some(5), Some(1), a),
            contract("VOL", 110.0, None, Some(50), a),
            contract("HIGH", 115.0, Some(500), None, a),
        ],
        puts: vec![],
    };
    let svc = FakeOptions::new(&[a]).with_chain(a, chain);

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap();

    let order: Vec<&str> = rows.iter().map(|r| r.contract_symbol.as_str()).collect();
    assert_eq!(order, vec!["HIGH", "LOW", "VOL", "NONE"]);
}

#[tokio::test]
async fn ties_keep_expiry_order_even_when_later_expiries_finish_first() {
    let (a, b) = (date("2024-01-19"), date("2024-02-16"));
    let flat = |exp, tag: &str| OptionChain {
        calls: vec![contract(&format!("{tag}-C"), 100.0, None, None, exp)],
        puts: vec![contract(&format!("{tag}-P"), 100.0, None, None, exp)],
    };
    let svc = FakeOptions::new(&[a, b])
        .with_slow_chain(a, Duration::from_millis(60), flat(a, "A"))
        .with_chain(b, flat(b, "B"));

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap();

    let order: Vec<&str> = rows.iter().map(|r| r.contract_symbol.as_str()).collect();
    assert_eq!(order, vec!["A-C", "A-P", "B-C", "B-P"]);
    assert_eq!(rows[0].expiry_date, a);
    assert_eq!(rows[3].expiry_date, b);
}

#[tokio::test]
async fn slow_expiry_times_out_and_is_skipped() {
    let (logs, _guard) = common::capture_logs();
    let (a, b) = (date("2024-01-19"), date("2024-02-16"));
    let svc = FakeOptions::new(&[a, b])
        .with_chain(a, chain_of(a, 2))
        .with_slow_chain(b, Duration::from_secs(5), chain_of(b, 2));
    let cfg = AgentConfig {
        expiry_timeout: Some(Duration::from_millis(100)),
        ..AgentConfig::default()
    };

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &cfg)
        .await
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.expiry_date == a));
    let out = logs.contents();
    assert!(out.contains("timed out"), "{out}");
    assert!(out.contains("2024-02-16"), "{out}");
}

#[tokio::test]
async fn fan_out_respects_max_concurrency() {
    let expiries: Vec<_> = (1..=8).map(|d| date(&format!("2024-01-{d:02}"))).collect();
    let mut svc = FakeOptions::new(&expiries);
    for &e in &expiries {
        svc = svc.with_chain(e, chain_of(e, 1));
    }
    let cfg = AgentConfig {
        max_concurrency: 2,
        expiry_timeout: None,
    };

    let rows = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &cfg)
        .await
        .unwrap();

    assert_eq!(rows.len(), 16);
    let peak = svc.max_in_flight.load(std::sync::atomic::Ordering::SeqCst);
    assert!(peak <= 2, "peak concurrency {peak}");
    assert!(peak >= 1);
}

#[tokio::test]
async fn expiry_discovery_failure_is_reported() {
    let (logs, _guard) = common::capture_logs();
    let svc = FakeOptions::failing_discovery("connection reset");

    let err = fetch_filtered(&svc, "AAPL", &OptionsFilter::new(), &config())
        .await
        .unwrap_err();

    assert!(matches!(err, OptionsError::Failed(_)));
    assert!(
        err.to_string().starts_with("Failed to retrieve options data: "),
        "{err}"
    );
    assert!(err.to_string().contains("connection reset"));
    assert!(logs.contents().contains("ERROR"));
}

#[test]
fn default_pool_is_bounded() {
    let cfg = AgentConfig::default();
    assert!(cfg.max_concurrency >= 1 && cfg.max_concurrency <= 32);
    assert_eq!(cfg.expiry_timeout, Some(Duration::from_secs(30)));
}
