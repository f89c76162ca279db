//! Caller-facing request and response records.

use bridge_traits::WeightUnit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Total steps for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStepEntry {
    /// `YYYY-MM-DD` in the bridge's configured zone
    pub date: String,
    pub value: u64,
}

/// Daily totals attributed to one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedSteps {
    /// `appPackage` or `appPackage:stream`
    pub source: String,
    pub steps: Vec<DailyStepEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceSample {
    pub start_date: String,
    pub end_date: String,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSample {
    pub start_date: String,
    pub end_date: String,
    /// In the unit the query asked for
    pub value: f64,
}

/// Weight to save or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecordRequest {
    pub value: f64,
    #[serde(default)]
    pub unit: WeightUnit,
    /// Any date string [`parse_date_string`](crate::dates::parse_date_string) accepts
    pub date: String,
}

impl WeightRecordRequest {
    pub fn new(value: f64, unit: WeightUnit, date: impl Into<String>) -> Self {
        Self {
            value,
            unit,
            date: date.into(),
        }
    }
}

/// Weight history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightQuery {
    #[serde(default)]
    pub unit: WeightUnit,
    pub start_date: String,
    pub end_date: String,
}

impl WeightQuery {
    pub fn new(unit: WeightUnit, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            unit,
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

/// Query window, start inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Payload handed to history listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepHistoryUpdate {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub steps: u64,
}

/// Payload handed to authorization listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUpdate {
    pub authorized: bool,
    pub message: Option<String>,
}
