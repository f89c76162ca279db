//! # Core Runtime
//!
//! Runtime infrastructure shared by the fitness bridge:
//! - Bridge configuration with fail-fast validation
//! - In-process event bus (default broadcast hub)
//! - Logging and tracing setup with host log forwarding

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{BridgeConfig, BridgeConfigBuilder, TimeZonePolicy};
pub use error::{Error, Result};
pub use events::{EventBus, EventStream};
