// src/normalize.rs
use crate::models::{PerformancePoint, PricePoint};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

/// Value of the initial investment every series is rebased to.
pub const BASE_VALUE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub series: Vec<PerformancePoint>,
    pub final_value: f64,
}

/// Rebases `prices` so the first point on or after `start` is worth 100.
///
/// Returns `None` when no point falls inside the window or when the base
/// price is not positive.
pub fn normalize(prices: &[PricePoint], start: NaiveDate) -> Option<Normalized> {
    let mut sorted: Vec<&PricePoint> = prices.iter().collect();
    sorted.sort_by_key(|p| p.date);

    let base_index = sorted.iter().position(|p| p.date >= start)?;
    let base_price = sorted[base_index].price;
    // Also rejects NaN.
    if !(base_price > 0.0) {
        return None;
    }

    let series: Vec<PerformancePoint> = sorted[base_index..]
        .iter()
        .map(|p| PerformancePoint {
            time: timestamp_of(p.date),
            value: BASE_VALUE * p.price / base_price,
        })
        .collect();
    let final_value = series.last().map_or(BASE_VALUE, |p| p.value);

    Some(Normalized {
        series,
        final_value,
    })
}

/// Midnight UTC of `date`, in Unix seconds.
pub fn timestamp_of(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .timestamp()
}
