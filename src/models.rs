// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily bar as returned by the provider. `price` is the adjusted close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistory {
    pub symbol: String,
    pub name: String,
    pub prices: Vec<PricePoint>,
}

/// A rebased value at a point in time (Unix seconds). 100 means break-even.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub ticker1: String,
    pub ticker2: String,
    pub series1: Vec<PerformancePoint>,
    pub series2: Vec<PerformancePoint>,
    pub final_value1: f64,
    pub final_value2: f64,
}
