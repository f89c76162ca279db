//! Fitness Capability Abstraction
//!
//! Contract for the platform fitness-tracking service (Google Fit on Android,
//! HealthKit on iOS, a simulator on desktop). The core never talks to the
//! platform SDK directly; hosts implement [`FitnessCapability`] and hand it to
//! the bridge.
//!
//! The wire types in this module mirror the payloads the host SDKs return and
//! deserialize straight from the host's JSON (camelCase keys, timestamps as
//! epoch milliseconds or RFC 3339 strings).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Unit a weight value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "kg", alias = "kilogram")]
    Kilogram,
    #[serde(rename = "pound", alias = "lb")]
    Pound,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Pound => "pound",
        }
    }
}

/// Application (and optional stream) that recorded a set of samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInfo {
    pub app_package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

/// Raw step sample as returned by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeStepSample {
    #[serde(with = "native_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub steps: Option<u64>,
}

/// Step samples grouped by originating data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSourceSteps {
    pub source: DataSourceInfo,
    /// `None` entries are gaps in the host's sample array.
    #[serde(default)]
    pub steps: Vec<Option<NativeStepSample>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeDistanceSample {
    #[serde(with = "native_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "native_timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub distance: Option<f64>,
}

/// Weight sample; `value` is always kilograms on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeWeightSample {
    #[serde(with = "native_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "native_timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Weight record handed to the host for saving or deleting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeWeightRecord {
    /// Kilograms, regardless of `unit`.
    pub value: f64,
    /// Unit the caller originally supplied.
    pub unit: WeightUnit,
    /// Epoch milliseconds.
    pub date: i64,
}

/// Platform fitness-tracking service.
///
/// Every method maps one-to-one onto a host SDK call. Failures are reported
/// as [`BridgeError::OperationFailed`](crate::BridgeError::OperationFailed)
/// carrying the host's message; the core passes it through unchanged.
///
/// Ranges are epoch milliseconds, `start_ms` inclusive.
///
/// # Platform Support
///
/// - **Android**: Google Fit History / Sensors APIs
/// - **iOS**: HealthKit
/// - **Desktop/Tests**: in-memory fakes
///
/// # Example
///
/// ```ignore
/// use bridge_traits::fitness::FitnessCapability;
///
/// async fn can_read(fitness: &dyn FitnessCapability) -> bool {
///     fitness.is_available().await.unwrap_or(false) && fitness.is_enabled().await.unwrap_or(false)
/// }
/// ```
#[async_trait]
pub trait FitnessCapability: Send + Sync {
    /// Run the platform consent flow.
    async fn authorize(&self) -> Result<bool>;

    /// Legacy daily step query. Results are delivered on the history channel.
    async fn get_daily_steps(&self, start_ms: i64, end_ms: i64) -> Result<()>;

    /// Legacy weekly step query. Results are delivered on the history channel.
    async fn get_weekly_steps(&self, start_ms: i64, end_ms: i64) -> Result<()>;

    async fn get_daily_step_count_samples(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<NativeSourceSteps>>;

    async fn get_daily_distance_samples(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<NativeDistanceSample>>;

    async fn get_weight_samples(&self, start_ms: i64, end_ms: i64)
        -> Result<Vec<NativeWeightSample>>;

    async fn save_weight(&self, record: NativeWeightRecord) -> Result<bool>;

    async fn delete_weight(&self, record: NativeWeightRecord) -> Result<bool>;

    /// Whether the fitness service is installed on the device.
    async fn is_available(&self) -> Result<bool>;

    /// Whether the user has granted access.
    async fn is_enabled(&self) -> Result<bool>;

    /// Start emitting live step counts on the step-changed channel.
    async fn observe_steps(&self) -> Result<()>;
}

/// Serde adapter for host timestamps.
///
/// Accepts epoch milliseconds (integer or float) or RFC 3339 strings; always
/// writes epoch milliseconds.
pub mod native_timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        FractionalMillis(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => from_millis(ms).map_err(de::Error::custom),
            Raw::FractionalMillis(ms) => {
                if !ms.is_finite() {
                    return Err(de::Error::custom("timestamp is not a finite number"));
                }
                from_millis(ms.trunc() as i64).map_err(de::Error::custom)
            }
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| de::Error::custom(format!("invalid timestamp '{text}': {e}"))),
        }
    }

    fn from_millis(ms: i64) -> Result<DateTime<Utc>, String> {
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| format!("timestamp {ms} is out of range"))
    }
}
