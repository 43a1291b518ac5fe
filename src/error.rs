// src/error.rs
use log::error;
use serde_json::json;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("symbol not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("provider error: {0}")]
    Upstream(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

#[derive(Debug)]
pub struct FetchFailure {
    pub ticker: String,
    pub error: ProviderError,
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("{}", describe_fetch_failures(.0))]
    Fetch(Vec<FetchFailure>),
    #[error("No price data for {ticker} in the selected timeframe")]
    Processing { ticker: String },
}

impl CompareError {
    /// True when every failed fetch was an unknown symbol.
    pub fn is_not_found(&self) -> bool {
        match self {
            CompareError::Fetch(failures) => {
                !failures.is_empty() && failures.iter().all(|f| f.error.is_not_found())
            }
            CompareError::Processing { .. } => false,
        }
    }
}

fn describe_fetch_failures(failures: &[FetchFailure]) -> String {
    let tickers = failures
        .iter()
        .map(|f| f.ticker.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !failures.is_empty() && failures.iter().all(|f| f.error.is_not_found()) {
        format!("Ticker not found: {}", tickers)
    } else {
        format!("Failed to fetch data for {}", tickers)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors surfaced to HTTP clients as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("No data found for symbol {0}")]
    NotFound(String),
    #[error(transparent)]
    Compare(#[from] CompareError),
    #[error("Failed to fetch stock data")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Compare(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Compare(CompareError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Compare(CompareError::Processing { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(e) = err.find::<ApiError>() {
        (e.status(), e.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::MissingHeader>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}
