//! Broadcast Channel Abstraction
//!
//! Live updates from the fitness service (step changes, history refreshes,
//! authorization results) travel over a named publish/subscribe mechanism
//! owned by the host, e.g. React Native's `DeviceEventEmitter` or an
//! Android `LocalBroadcastManager`. [`BroadcastHub`] is the contract the
//! core relies on; `core-runtime` ships an in-process implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::fitness::native_timestamp;

/// Named channels used by the fitness service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventChannel {
    #[serde(rename = "StepChangedEvent")]
    StepChanged,
    #[serde(rename = "StepHistoryChangedEvent")]
    StepHistoryChanged,
    #[serde(rename = "AuthorizeEvent")]
    Authorize,
}

impl EventChannel {
    pub const ALL: [EventChannel; 3] = [
        EventChannel::StepChanged,
        EventChannel::StepHistoryChanged,
        EventChannel::Authorize,
    ];

    /// Channel name as the host emits it.
    pub fn name(&self) -> &'static str {
        match self {
            EventChannel::StepChanged => "StepChangedEvent",
            EventChannel::StepHistoryChanged => "StepHistoryChangedEvent",
            EventChannel::Authorize => "AuthorizeEvent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

impl fmt::Display for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payloads published by the fitness service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum FitnessEvent {
    /// Live step counter update.
    StepChanged { steps: u64 },
    /// A history query finished (legacy step queries report here).
    #[serde(rename_all = "camelCase")]
    StepHistoryChanged {
        #[serde(with = "native_timestamp")]
        start_date: DateTime<Utc>,
        #[serde(with = "native_timestamp")]
        end_date: DateTime<Utc>,
        steps: u64,
    },
    /// Asynchronous result of the consent flow.
    AuthorizationChanged {
        authorized: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl FitnessEvent {
    /// Channel this event is published on.
    pub fn channel(&self) -> EventChannel {
        match self {
            FitnessEvent::StepChanged { .. } => EventChannel::StepChanged,
            FitnessEvent::StepHistoryChanged { .. } => EventChannel::StepHistoryChanged,
            FitnessEvent::AuthorizationChanged { .. } => EventChannel::Authorize,
        }
    }
}

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback invoked for each event on a channel.
pub type Listener = Arc<dyn Fn(&FitnessEvent) + Send + Sync>;

/// Named-channel publish/subscribe mechanism.
///
/// Listeners accumulate: registering the same callback twice delivers each
/// event twice.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::events::{BroadcastHub, EventChannel};
/// use std::sync::Arc;
///
/// fn log_steps(hub: &dyn BroadcastHub) -> bridge_traits::error::Result<()> {
///     hub.add_listener(
///         EventChannel::StepChanged,
///         Arc::new(|event| println!("{event:?}")),
///     )?;
///     Ok(())
/// }
/// ```
pub trait BroadcastHub: Send + Sync {
    /// Register `listener` on `channel`.
    fn add_listener(&self, channel: EventChannel, listener: Listener) -> Result<ListenerId>;

    /// Remove a single listener. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> Result<bool>;

    /// Remove every listener on every channel, regardless of who added it.
    fn remove_all_listeners(&self) -> Result<()>;

    /// Publish an event on its channel. Returns how many receivers got it.
    fn emit(&self, event: FitnessEvent) -> Result<usize>;

    /// Number of listeners registered on `channel`.
    fn listener_count(&self, channel: EventChannel) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_round_trip() {
        for channel in EventChannel::ALL {
            assert_eq!(EventChannel::from_name(channel.name()), Some(channel));
        }
        assert_eq!(EventChannel::from_name("SomethingElse"), None);
    }

    #[test]
    fn test_event_channel_mapping() {
        let event = FitnessEvent::AuthorizationChanged {
            authorized: true,
            message: None,
        };
        assert_eq!(event.channel(), EventChannel::Authorize);
        assert_eq!(
            FitnessEvent::StepChanged { steps: 12 }.channel(),
            EventChannel::StepChanged
        );
    }

    #[test]
    fn test_history_event_from_host_json() {
        let json = r#"{
            "event": "StepHistoryChanged",
            "startDate": 1704067200000,
            "endDate": "2024-01-02T00:00:00Z",
            "steps": 4200
        }"#;

        let event: FitnessEvent = serde_json::from_str(json).unwrap();
        match event {
            FitnessEvent::StepHistoryChanged {
                start_date,
                end_date,
                steps,
            } => {
                assert_eq!(start_date.timestamp_millis(), 1704067200000);
                assert_eq!(end_date.timestamp_millis(), 1704153600000);
                assert_eq!(steps, 4200);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_listener_ids_are_unique() {
        assert_ne!(ListenerId::new(), ListenerId::new());
    }
}
