//! Integration tests for `YahooClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use tickersent_market::{total_return, MarketError, YahooClient, YahooClientConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, max_retries: u32) -> YahooClient {
    let config = YahooClientConfig {
        timeout_secs: 5,
        user_agent: "tickersent-test".to_string(),
        max_retries,
        retry_backoff_base_ms: 0,
    };
    YahooClient::with_base_url(&config, base_url).expect("client construction should not fail")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn chart_body() -> serde_json::Value {
    // Exchange-local trading days 2023-01-03, 2023-06-15, 2023-06-16, 2023-12-29.
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": "GE",
                    "longName": "General Electric Company",
                    "gmtoffset": -18000
                },
                "timestamp": [1672756200, 1686835800, 1686922200, 1703860200],
                "events": {
                    "dividends": {
                        "1686835800": { "amount": 5.0, "date": 1686835800 }
                    }
                },
                "indicators": {
                    "quote": [{
                        "open": [100.0, 104.0, 50.0, 109.0],
                        "close": [100.5, 104.5, 51.0, 110.0]
                    }]
                }
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn fetch_history_returns_bars_with_dividends() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .and(query_param("interval", "1d"))
        .and(query_param("events", "div"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let history = client
        .fetch_history("GE", date(2023, 1, 1), date(2023, 12, 31))
        .await
        .expect("should parse history");

    assert_eq!(history.symbol, "GE");
    assert_eq!(
        history.company_name.as_deref(),
        Some("General Electric Company")
    );
    assert_eq!(history.bars.len(), 4);
    assert_eq!(history.bars[0].date, date(2023, 1, 3));
    assert_eq!(history.bars[1].date, date(2023, 6, 15));
    assert!((history.bars[1].dividends - 5.0).abs() < 1e-12);

    let result = total_return(&history.bars, date(2023, 1, 1), date(2023, 12, 31)).unwrap();
    assert_eq!(result.lots.len(), 1);
    assert_eq!(result.lots[0].acquired, date(2023, 6, 16));
    assert!((result.lots[0].shares - 0.1).abs() < 1e-12);
    assert!((result.buy_price - 100.0).abs() < 1e-12);
}

#[tokio::test]
async fn bars_outside_window_are_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .mount(&server)
        .await;

    let history = test_client(&server.uri(), 0)
        .fetch_history("GE", date(2023, 6, 1), date(2023, 6, 30))
        .await
        .unwrap();
    assert_eq!(history.bars.len(), 2);
}

#[tokio::test]
async fn unknown_symbol_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 3)
        .fetch_history("NOPE", date(2023, 1, 1), date(2023, 12, 31))
        .await;
    assert!(matches!(result, Err(MarketError::Api(_))));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let history = test_client(&server.uri(), 3)
        .fetch_history("GE", date(2023, 1, 1), date(2023, 12, 31))
        .await
        .expect("should succeed after retries");
    assert_eq!(history.bars.len(), 4);
}

#[tokio::test]
async fn server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = test_client(&server.uri(), 2)
        .fetch_history("GE", date(2023, 1, 1), date(2023, 12, 31))
        .await;
    assert!(matches!(
        result,
        Err(MarketError::Unavailable { status: 500 })
    ));
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let history = test_client(&server.uri(), 1)
        .fetch_history("GE", date(2023, 1, 1), date(2023, 12, 31))
        .await
        .expect("should succeed after a rate-limited attempt");
    assert_eq!(history.company_name.as_deref(), Some("General Electric Company"));
}
