//! # Host Bridge Traits
//!
//! Contracts that each host platform implements so the fitness core can run
//! on it.
//!
//! ## Traits
//!
//! - [`FitnessCapability`](fitness::FitnessCapability) - The platform fitness service
//!   (authorization, step/distance/weight queries, weight writes, live steps)
//! - [`BroadcastHub`](events::BroadcastHub) - Named-channel publish/subscribe used
//!   for live updates
//! - [`Clock`](time::Clock) - Time source for "now"-relative queries
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Fitness service | Broadcast mechanism |
//! |----------|-----------------|---------------------|
//! | Android  | Google Fit      | `DeviceEventEmitter` / in-process bus |
//! | iOS      | HealthKit       | `NotificationCenter` / in-process bus |
//! | Desktop  | test fakes      | in-process bus (`core-runtime`) |
//!
//! ## Error Handling
//!
//! Every trait reports failures as [`BridgeError`]. A rejected host call is
//! `BridgeError::OperationFailed` carrying the host's message unchanged; the
//! core passes that message to callers verbatim.
//!
//! Callback-based SDKs can use [`reply::reply_channel`] to turn an
//! `(on_error, on_success)` pair into the single future these traits expect.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so a single implementation can be shared
//! across async tasks behind an `Arc`.

pub mod error;
pub mod events;
pub mod fitness;
pub mod reply;
pub mod time;

pub use error::BridgeError;

pub use events::{BroadcastHub, EventChannel, FitnessEvent, Listener, ListenerId};
pub use fitness::{
    DataSourceInfo, FitnessCapability, NativeDistanceSample, NativeSourceSteps,
    NativeStepSample, NativeWeightRecord, NativeWeightSample, WeightUnit,
};
pub use reply::{reply_channel, NativeReply, PendingReply};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
