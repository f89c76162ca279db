//! # Bridge Configuration
//!
//! Builder-based configuration for the fitness bridge.
//!
//! ## Required Dependencies
//!
//! - `FitnessCapability` - the host fitness service
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `BroadcastHub` - live-update channel (default: in-process [`EventBus`])
//! - `Clock` - time source (default: [`SystemClock`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{BridgeConfig, TimeZonePolicy};
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .capability(Arc::new(GoogleFitAdapter::new()))
//!     .time_zone(TimeZonePolicy::Local)
//!     .build()?;
//! ```
//!
//! A missing capability fails fast:
//!
//! ```
//! use core_runtime::config::BridgeConfig;
//!
//! let err = BridgeConfig::builder().build().unwrap_err();
//! assert!(err.to_string().contains("FitnessCapability"));
//! ```

use crate::error::{Error, Result};
use crate::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};
use bridge_traits::{BroadcastHub, Clock, FitnessCapability, SystemClock};
use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::sync::Arc;

/// Upper bound for the in-process event buffer.
pub const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Time zone used to turn instants into calendar days and to interpret
/// date-times that carry no offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZonePolicy {
    /// Zone of the running device. Step tracking reports days as the user
    /// experienced them.
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl TimeZonePolicy {
    /// Calendar day of `instant` as `YYYY-MM-DD`.
    pub fn day_key(&self, instant: DateTime<Utc>) -> String {
        const DAY: &str = "%Y-%m-%d";
        match self {
            TimeZonePolicy::Local => instant.with_timezone(&Local).format(DAY).to_string(),
            TimeZonePolicy::Utc => instant.format(DAY).to_string(),
            TimeZonePolicy::Fixed(offset) => instant.with_timezone(offset).format(DAY).to_string(),
        }
    }

    /// Interpret a wall-clock time in this zone.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant;
    /// non-existent times (DST spring-forward) yield `None`.
    pub fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            TimeZonePolicy::Local => earliest(Local.from_local_datetime(&naive)),
            TimeZonePolicy::Utc => Some(Utc.from_utc_datetime(&naive)),
            TimeZonePolicy::Fixed(offset) => earliest(offset.from_local_datetime(&naive)),
        }
    }
}

fn earliest<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    result.earliest().map(|dt| dt.with_timezone(&Utc))
}

/// Configuration consumed by `FitnessBridge`.
#[derive(Clone)]
pub struct BridgeConfig {
    pub capability: Arc<dyn FitnessCapability>,
    pub broadcast: Arc<dyn BroadcastHub>,
    pub clock: Arc<dyn Clock>,
    pub time_zone: TimeZonePolicy,
    /// Capacity of the default in-process event bus
    pub event_buffer_size: usize,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("capability", &"FitnessCapability { ... }")
            .field("broadcast", &"BroadcastHub { ... }")
            .field("clock", &"Clock { ... }")
            .field("time_zone", &self.time_zone)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Checks values that the builder cannot enforce by type.
    pub fn validate(&self) -> Result<()> {
        check_event_buffer_size(self.event_buffer_size)
    }
}

fn check_event_buffer_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::Config(
            "Event buffer size must be greater than 0".to_string(),
        ));
    }

    if size > MAX_EVENT_BUFFER_SIZE {
        return Err(Error::Config(format!(
            "Event buffer size exceeds maximum of {MAX_EVENT_BUFFER_SIZE}"
        )));
    }

    Ok(())
}

fn capability_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FitnessCapability".to_string(),
        message: "A fitness service implementation is required. \
                 Android: inject a Google Fit adapter. \
                 iOS: inject a HealthKit adapter. \
                 Tests: inject a fake implementation."
            .to_string(),
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    capability: Option<Arc<dyn FitnessCapability>>,
    broadcast: Option<Arc<dyn BroadcastHub>>,
    clock: Option<Arc<dyn Clock>>,
    time_zone: TimeZonePolicy,
    event_buffer_size: Option<usize>,
}

impl BridgeConfigBuilder {
    /// Host fitness service (required).
    pub fn capability(mut self, capability: Arc<dyn FitnessCapability>) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Host broadcast mechanism. Defaults to an in-process [`EventBus`].
    pub fn broadcast(mut self, hub: Arc<dyn BroadcastHub>) -> Self {
        self.broadcast = Some(hub);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn time_zone(mut self, policy: TimeZonePolicy) -> Self {
        self.time_zone = policy;
        self
    }

    /// Only used when no broadcast hub is injected.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::CapabilityMissing` when no `FitnessCapability` was provided
    /// - `Error::Config` when the event buffer size is out of range
    pub fn build(self) -> Result<BridgeConfig> {
        let capability = self.capability.ok_or_else(capability_missing_error)?;
        let event_buffer_size = self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);

        check_event_buffer_size(event_buffer_size)?;

        let broadcast = match self.broadcast {
            Some(hub) => hub,
            None => Arc::new(EventBus::new(event_buffer_size)),
        };

        Ok(BridgeConfig {
            capability,
            broadcast,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            time_zone: self.time_zone,
            event_buffer_size,
        })
    }
}
