// src/timeframe.rs
use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lookback window selector used by both the stock and comparison endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Timeframe {
    OneYear,
    TwoYears,
    ThreeYears,
    FiveYears,
    All,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown timeframe: {0}")]
pub struct UnknownTimeframe(pub String);

impl Timeframe {
    /// Lenient parse: anything unrecognized behaves like "1y".
    pub fn parse(token: &str) -> Self {
        token.parse().unwrap_or_else(|e: UnknownTimeframe| {
            debug!("{}, falling back to 1y", e);
            Timeframe::OneYear
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneYear => "1y",
            Timeframe::TwoYears => "2y",
            Timeframe::ThreeYears => "3y",
            Timeframe::FiveYears => "5y",
            Timeframe::All => "all",
        }
    }

    pub fn years(&self) -> Option<i32> {
        match self {
            Timeframe::OneYear => Some(1),
            Timeframe::TwoYears => Some(2),
            Timeframe::ThreeYears => Some(3),
            Timeframe::FiveYears => Some(5),
            Timeframe::All => None,
        }
    }

    /// First date of the window ending at `end`. Year-based windows reach back
    /// one extra day so the closing price before the period is included.
    pub fn resolve_start(&self, end: NaiveDate) -> NaiveDate {
        match self.years() {
            Some(years) => years_before(end, years)
                .checked_sub_signed(Duration::days(1))
                .unwrap_or(NaiveDate::MIN),
            None => NaiveDate::MIN,
        }
    }
}

/// Shorthand for `Timeframe::parse(token).resolve_start(end)`.
pub fn resolve_start(end: NaiveDate, token: &str) -> NaiveDate {
    Timeframe::parse(token).resolve_start(end)
}

fn years_before(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() - years;
    date.with_year(year)
        // Feb 29 rolls over to Mar 1 when the target year has no leap day.
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(NaiveDate::MIN)
}

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(Timeframe::OneYear),
            "2y" => Ok(Timeframe::TwoYears),
            "3y" => Ok(Timeframe::ThreeYears),
            "5y" => Ok(Timeframe::FiveYears),
            "all" => Ok(Timeframe::All),
            _ => Err(UnknownTimeframe(s.to_string())),
        }
    }
}

impl From<String> for Timeframe {
    fn from(token: String) -> Self {
        Timeframe::parse(&token)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
