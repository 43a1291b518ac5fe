// src/format.rs
use crate::models::ComparisonResult;
use crate::normalize::BASE_VALUE;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSummary {
    pub ticker: String,
    pub final_value: String,
    pub change: String,
}

/// Display strings for a comparison: what $100 became, and over which dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tickers: Vec<TickerSummary>,
}

pub fn summarize(result: &ComparisonResult) -> ComparisonSummary {
    let firsts = [result.series1.first(), result.series2.first()];
    let lasts = [result.series1.last(), result.series2.last()];
    let start = firsts.iter().flatten().map(|p| p.time).min();
    let end = lasts.iter().flatten().map(|p| p.time).max();

    ComparisonSummary {
        start_date: start.and_then(format_timestamp),
        end_date: end.and_then(format_timestamp),
        tickers: vec![
            ticker_summary(&result.ticker1, result.final_value1),
            ticker_summary(&result.ticker2, result.final_value2),
        ],
    }
}

fn ticker_summary(ticker: &str, final_value: f64) -> TickerSummary {
    TickerSummary {
        ticker: ticker.to_string(),
        final_value: format_currency(final_value),
        change: format_percent_change(final_value),
    }
}

/// `1234.5` becomes `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let total_cents = (amount.abs() * 100.0).round() as u64;
    let digits = (total_cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && total_cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, total_cents % 100)
}

/// Change relative to the $100 base, e.g. `+50.00%`.
pub fn format_percent_change(value: f64) -> String {
    format!("{:+.2}%", value - BASE_VALUE)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| format_date(dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerformancePoint;
    use crate::normalize::timestamp_of;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(100.0), "$100.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(0.004), "$0.00");
        assert_eq!(format_currency(-1.0), "-$1.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn percent_change_is_signed() {
        assert_eq!(format_percent_change(150.0), "+50.00%");
        assert_eq!(format_percent_change(87.5), "-12.50%");
        assert_eq!(format_percent_change(100.0), "+0.00%");
    }

    #[test]
    fn dates_are_human_readable() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(format_date(date), "Jun 5, 2024");
        assert_eq!(format_timestamp(timestamp_of(date)).as_deref(), Some("Jun 5, 2024"));
    }

    #[test]
    fn summary_spans_both_series() {
        let d = |m, d| timestamp_of(NaiveDate::from_ymd_opt(2024, m, d).unwrap());
        let result = ComparisonResult {
            ticker1: "AAPL".into(),
            ticker2: "MSFT".into(),
            series1: vec![
                PerformancePoint { time: d(1, 3), value: 100.0 },
                PerformancePoint { time: d(6, 14), value: 150.0 },
            ],
            series2: vec![
                PerformancePoint { time: d(1, 2), value: 100.0 },
                PerformancePoint { time: d(6, 13), value: 120.0 },
            ],
            final_value1: 150.0,
            final_value2: 120.0,
        };

        let summary = summarize(&result);
        assert_eq!(summary.start_date.as_deref(), Some("Jan 2, 2024"));
        assert_eq!(summary.end_date.as_deref(), Some("Jun 14, 2024"));
        assert_eq!(
            summary.tickers[0],
            TickerSummary {
                ticker: "AAPL".into(),
                final_value: "$150.00".into(),
                change: "+50.00%".into(),
            }
        );
        assert_eq!(summary.tickers[1].change, "+20.00%");
    }
}
