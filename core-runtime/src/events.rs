//! # Event Bus
//!
//! In-process [`BroadcastHub`] used when the host does not inject its own
//! broadcast mechanism.
//!
//! ## Overview
//!
//! The bus carries [`FitnessEvent`]s to two kinds of consumers:
//! - **Callback listeners** registered per channel through
//!   [`BroadcastHub::add_listener`]. They run synchronously on the emitting
//!   thread, in registration order.
//! - **Stream subscribers** created with [`EventBus::subscribe`], backed by a
//!   `tokio::sync::broadcast` channel and consumed through [`EventStream`].
//!
//! ```text
//!  host adapter ──emit──▶ ┌──────────┐ ──callback──▶ observe_steps listener
//!                         │ EventBus │ ──callback──▶ on_authorize listener
//!                         └──────────┘ ──broadcast─▶ EventStream (filtered)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::events::{BroadcastHub, EventChannel, FitnessEvent};
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//!
//! let bus = EventBus::new(16);
//! bus.add_listener(
//!     EventChannel::StepChanged,
//!     Arc::new(|event: &FitnessEvent| println!("steps: {event:?}")),
//! )
//! .unwrap();
//!
//! let delivered = bus.emit(FitnessEvent::StepChanged { steps: 42 }).unwrap();
//! assert_eq!(delivered, 1);
//! ```
//!
//! ## Lagging
//!
//! Stream subscribers that fall more than `capacity` events behind receive
//! `RecvError::Lagged(n)` and may keep reading. Callback listeners never lag.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::events::{BroadcastHub, EventChannel, FitnessEvent, Listener, ListenerId};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::trace;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for stream subscribers.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

struct Registration {
    id: ListenerId,
    channel: EventChannel,
    listener: Listener,
}

/// In-process broadcast hub.
///
/// Cloning is cheap; clones share listeners and the broadcast channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FitnessEvent>,
    registrations: Arc<RwLock<Vec<Registration>>>,
}

impl EventBus {
    /// Creates a bus whose stream subscribers buffer up to `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (see `tokio::sync::broadcast::channel`).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            registrations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Publishes to callback listeners on the event's channel, then to stream
    /// subscribers.
    ///
    /// Returns the total number of receivers, or `SendError` when nobody was
    /// listening at all.
    pub fn publish(&self, event: FitnessEvent) -> Result<usize, SendError<FitnessEvent>> {
        let channel = event.channel();
        let listeners: Vec<Listener> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|registration| registration.channel == channel)
            .map(|registration| Arc::clone(&registration.listener))
            .collect();

        // Lock is released here so listeners may (un)register re-entrantly.
        for listener in &listeners {
            listener(&event);
        }

        trace!(channel = %channel, listeners = listeners.len(), "Dispatched event");

        match self.sender.send(event) {
            Ok(streams) => Ok(listeners.len() + streams),
            Err(err) if listeners.is_empty() => Err(err),
            Err(_) => Ok(listeners.len()),
        }
    }

    /// Creates a stream subscriber receiving every future event.
    pub fn subscribe(&self) -> Receiver<FitnessEvent> {
        self.sender.subscribe()
    }

    /// Number of stream subscribers (callback listeners are not counted).
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn total_listeners(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl BroadcastHub for EventBus {
    fn add_listener(&self, channel: EventChannel, listener: Listener) -> BridgeResult<ListenerId> {
        let id = ListenerId::new();
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                channel,
                listener,
            });
        trace!(channel = %channel, listener_id = %id, "Listener added");
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) -> BridgeResult<bool> {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        Ok(registrations.len() != before)
    }

    fn remove_all_listeners(&self) -> BridgeResult<()> {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn emit(&self, event: FitnessEvent) -> BridgeResult<usize> {
        Ok(self.publish(event).unwrap_or(0))
    }

    fn listener_count(&self, channel: EventChannel) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|registration| registration.channel == channel)
            .count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.total_listeners())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&FitnessEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use bridge_traits::events::EventChannel;
/// use core_runtime::events::{EventBus, EventStream};
///
/// let bus = EventBus::default();
/// let steps_only = EventStream::for_channel(bus.subscribe(), EventChannel::StepChanged);
/// ```
pub struct EventStream {
    receiver: Receiver<FitnessEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<FitnessEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Stream restricted to one channel.
    pub fn for_channel(receiver: Receiver<FitnessEvent>, channel: EventChannel) -> Self {
        Self::new(receiver).filter(move |event| event.channel() == channel)
    }

    /// Only events matching `predicate` are returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FitnessEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &FitnessEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if `n` events were missed, `RecvError::Closed`
    /// once every sender is gone.
    pub async fn recv(&mut self) -> Result<FitnessEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Next matching event without waiting; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Result<FitnessEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
