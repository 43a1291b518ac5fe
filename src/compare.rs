// src/compare.rs
use crate::error::{CompareError, FetchFailure};
use crate::models::{ComparisonResult, StockHistory};
use crate::normalize::{normalize, Normalized};
use crate::provider::ProviderClient;
use crate::timeframe::Timeframe;
use chrono::NaiveDate;
use log::{info, warn};

/// Fetches both tickers concurrently and rebases each to $100 at the start
/// of `timeframe`, with `end` as the shared end date.
pub async fn compare(
    provider: &ProviderClient,
    ticker1: &str,
    ticker2: &str,
    timeframe: Timeframe,
    end: NaiveDate,
) -> Result<ComparisonResult, CompareError> {
    let ticker1 = clean_ticker(ticker1);
    let ticker2 = clean_ticker(ticker2);
    let start = timeframe.resolve_start(end);
    info!(
        "Comparing {} and {} over {} (from {})",
        ticker1, ticker2, timeframe, start
    );

    let (first, second) = tokio::join!(
        provider.fetch_history(&ticker1, start, end),
        provider.fetch_history(&ticker2, start, end),
    );

    let (first, second) = match (first, second) {
        (Ok(first), Ok(second)) => (first, second),
        (first, second) => {
            let failures: Vec<FetchFailure> = [(&ticker1, first.err()), (&ticker2, second.err())]
                .into_iter()
                .filter_map(|(ticker, error)| {
                    error.map(|error| FetchFailure {
                        ticker: ticker.clone(),
                        error,
                    })
                })
                .collect();
            for failure in &failures {
                warn!("Fetch failed for {}: {}", failure.ticker, failure.error);
            }
            return Err(CompareError::Fetch(failures));
        }
    };

    let normalized1 = rebase(&ticker1, &first, start)?;
    let normalized2 = rebase(&ticker2, &second, start)?;

    Ok(ComparisonResult {
        ticker1,
        ticker2,
        series1: normalized1.series,
        series2: normalized2.series,
        final_value1: normalized1.final_value,
        final_value2: normalized2.final_value,
    })
}

fn rebase(ticker: &str, history: &StockHistory, start: NaiveDate) -> Result<Normalized, CompareError> {
    normalize(&history.prices, start).ok_or_else(|| {
        warn!("No usable price data for {} since {}", ticker, start);
        CompareError::Processing {
            ticker: ticker.to_string(),
        }
    })
}

pub fn clean_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}
