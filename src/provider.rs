// src/provider.rs
use crate::error::ProviderError;
use crate::models::{PricePoint, StockHistory};
use crate::normalize::timestamp_of;
use chrono::{DateTime, Duration, NaiveDate};
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct ChartMeta {
    symbol: String,
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    /// Exchange offset from UTC in seconds; bars are stamped at local open.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// 1900-01-01T00:00:00Z. Windows reaching further back are clamped here.
pub const EARLIEST_PERIOD: i64 = -2_208_988_800;

/// Client for a Yahoo-style daily chart API.
pub struct ProviderClient {
    http_client: Client,
    base_url: String,
}

impl ProviderClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches daily bars for `symbol` between `start` and `end` (inclusive).
    pub async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<StockHistory, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = timestamp_of(start).max(EARLIEST_PERIOD);
        let period2 = end
            .checked_add_signed(Duration::days(1))
            .map_or(i64::MAX, timestamp_of);
        debug!("Fetching {} from {} ({} to {})", symbol, url, period1, period2);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("Provider has no symbol {}", symbol);
            return Err(ProviderError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            error!("Failed to fetch data for {}: HTTP {}", symbol, status);
            return Err(ProviderError::Status(status.as_u16()));
        }

        let envelope = response.json::<ChartEnvelope>().await?;
        let history = parse_chart(symbol, envelope)?;
        info!(
            "Fetched {} price points for {} ({})",
            history.prices.len(),
            history.symbol,
            history.name
        );
        Ok(history)
    }
}

fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<StockHistory, ProviderError> {
    if let Some(err) = envelope.chart.error {
        return Err(if err.code.eq_ignore_ascii_case("Not Found") {
            ProviderError::NotFound(symbol.to_string())
        } else {
            ProviderError::Upstream(err.description.unwrap_or(err.code))
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))?;

    let name = result
        .meta
        .long_name
        .or(result.meta.short_name)
        .unwrap_or_else(|| result.meta.symbol.clone());

    let quote = result.indicators.quote.into_iter().next();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .map(|series| series.adjclose);

    let mut prices = match quote {
        Some(quote) => collect_points(
            &result.timestamp,
            result.meta.gmtoffset,
            &quote,
            adjclose.as_deref(),
        ),
        None => Vec::new(),
    };
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);

    Ok(StockHistory {
        symbol: result.meta.symbol,
        name,
        prices,
    })
}

/// Zips the column-oriented response into bars, dropping any bar with a
/// missing field. Without an adjusted-close column the close stands in.
fn collect_points(
    timestamps: &[i64],
    gmtoffset: i64,
    quote: &Quote,
    adjclose: Option<&[Option<f64>]>,
) -> Vec<PricePoint> {
    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts.checked_add(gmtoffset)?, 0)?.date_naive();
            let close = field(&quote.close, i)?;
            let price = match adjclose {
                Some(column) => field(column, i)?,
                None => close,
            };
            Some(PricePoint {
                date,
                price,
                open: field(&quote.open, i)?,
                high: field(&quote.high, i)?,
                low: field(&quote.low, i)?,
                close,
            })
        })
        .collect()
}

fn field(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten().filter(|v| v.is_finite())
}
