// src/testing.rs
//! Local stand-in for the upstream chart API, served by warp on an ephemeral port.
use crate::normalize::timestamp_of;
use crate::provider::ProviderClient;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::Filter;

pub enum Fixture {
    Prices {
        name: Option<&'static str>,
        points: Vec<(NaiveDate, f64)>,
    },
    Status(u16),
    Raw(Value),
}

/// Symbol and query parameters of one request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub symbol: String,
    pub query: HashMap<String, String>,
}

pub type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// Consecutive calendar days starting at `start`, one per price.
pub fn daily_series(start: NaiveDate, prices: &[f64]) -> Vec<(NaiveDate, f64)> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| (start + Duration::days(i as i64), price))
        .collect()
}

pub fn chart_body(symbol: &str, name: Option<&str>, points: &[(NaiveDate, f64)]) -> Value {
    let timestamps: Vec<i64> = points.iter().map(|(date, _)| timestamp_of(*date)).collect();
    let prices: Vec<f64> = points.iter().map(|(_, price)| *price).collect();
    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol, "longName": name },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": prices,
                        "high": prices,
                        "low": prices,
                        "close": prices,
                        "volume": vec![1_000; prices.len()]
                    }],
                    "adjclose": [{ "adjclose": prices }]
                }
            }],
            "error": null
        }
    })
}

fn not_found_body() -> Value {
    json!({
        "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
        }
    })
}

pub async fn mock_provider(fixtures: Vec<(&'static str, Fixture)>) -> ProviderClient {
    mock_provider_with_log(fixtures).await.0
}

/// Like [`mock_provider`], also returning every request the mock served.
pub async fn mock_provider_with_log(
    fixtures: Vec<(&'static str, Fixture)>,
) -> (ProviderClient, RequestLog) {
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let recorder = log.clone();
    let fixtures: Arc<HashMap<String, Fixture>> = Arc::new(
        fixtures
            .into_iter()
            .map(|(symbol, fixture)| (symbol.to_string(), fixture))
            .collect(),
    );

    let chart = warp::path!("v8" / "finance" / "chart" / String)
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(move |symbol: String, query: HashMap<String, String>| {
            recorder.lock().unwrap().push(RecordedRequest {
                symbol: symbol.clone(),
                query,
            });
            let (body, status) = match fixtures.get(&symbol) {
                Some(Fixture::Prices { name, points }) => {
                    (chart_body(&symbol, *name, points), StatusCode::OK)
                }
                Some(Fixture::Status(code)) => (
                    json!({ "error": "upstream failure" }),
                    StatusCode::from_u16(*code).unwrap(),
                ),
                Some(Fixture::Raw(body)) => (body.clone(), StatusCode::OK),
                None => (not_found_body(), StatusCode::NOT_FOUND),
            };
            warp::reply::with_status(warp::reply::json(&body), status)
        });

    let (addr, server) = warp::serve(chart).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    let client = ProviderClient::new(&format!("http://{}", addr), "stock-compare-tests").unwrap();
    (client, log)
}
