//! # Fitness Bridge
//!
//! Application-facing layer over a host fitness service (Google Fit,
//! HealthKit). The host implements [`bridge_traits::FitnessCapability`];
//! [`FitnessBridge`] forwards calls to it and reshapes the answers:
//!
//! - step samples summed into per-day totals for each data source
//! - distance and weight samples with ISO-8601 dates, empty entries dropped
//! - weight values converted between pounds and kilograms
//! - typed listener registration on the host's broadcast channels, with
//!   per-instance teardown
//!
//! ## Example
//!
//! ```ignore
//! use core_fitness::{DateRange, FitnessBridge};
//! use core_runtime::{BridgeConfig, TimeZonePolicy};
//!
//! let config = BridgeConfig::builder()
//!     .capability(google_fit_adapter)
//!     .time_zone(TimeZonePolicy::Local)
//!     .build()?;
//! let bridge = FitnessBridge::new(config);
//!
//! for source in bridge.get_daily_step_count_samples(DateRange::new(start, end)).await? {
//!     println!("{}: {} days", source.source, source.steps.len());
//! }
//!
//! bridge.observe_steps(|steps| println!("live: {steps}")).await?;
//! // ...
//! bridge.unsubscribe_listeners().await?;
//! ```

pub mod bridge;
pub mod dates;
pub mod error;
pub mod models;
pub mod normalize;
pub mod subscriptions;
pub mod units;

pub use bridge::FitnessBridge;
pub use error::{FitnessError, Metric, Result};
pub use models::{
    AuthorizationUpdate, DailyStepEntry, DateRange, DistanceSample, SourcedSteps,
    StepHistoryUpdate, WeightQuery, WeightRecordRequest, WeightSample,
};
pub use subscriptions::Subscription;

pub use bridge_traits::WeightUnit;
