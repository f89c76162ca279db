//! Listener handles owned by a bridge instance.
//!
//! Every listener a bridge registers is remembered here so teardown only
//! removes what that bridge added. Listeners installed by other bridges or
//! directly on the hub survive.

use std::sync::Arc;

use bridge_traits::{BroadcastHub, EventChannel, FitnessEvent, Listener, ListenerId};
use tokio::sync::Mutex;

use crate::models::{AuthorizationUpdate, StepHistoryUpdate};

/// Handle for one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    channel: EventChannel,
    id: ListenerId,
}

impl Subscription {
    pub fn channel(&self) -> EventChannel {
        self.channel
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

#[derive(Default)]
pub(crate) struct SubscriptionSet {
    handles: Mutex<Vec<Subscription>>,
}

impl SubscriptionSet {
    pub(crate) async fn register(
        &self,
        hub: &dyn BroadcastHub,
        channel: EventChannel,
        listener: Listener,
    ) -> bridge_traits::error::Result<Subscription> {
        let mut handles = self.handles.lock().await;
        let id = hub.add_listener(channel, listener)?;
        let subscription = Subscription { channel, id };
        handles.push(subscription);
        Ok(subscription)
    }

    /// Take every handle, leaving the set empty.
    pub(crate) async fn drain(&self) -> Vec<Subscription> {
        std::mem::take(&mut *self.handles.lock().await)
    }

    /// Put back handles that could not be released.
    pub(crate) async fn restore(&self, subscriptions: Vec<Subscription>) {
        self.handles.lock().await.extend(subscriptions);
    }

    pub(crate) async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }
}

pub(crate) fn step_listener<F>(callback: F) -> Listener
where
    F: Fn(u64) + Send + Sync + 'static,
{
    Arc::new(move |event: &FitnessEvent| {
        if let FitnessEvent::StepChanged { steps } = event {
            callback(*steps);
        }
    })
}

pub(crate) fn history_listener<F>(callback: F) -> Listener
where
    F: Fn(StepHistoryUpdate) + Send + Sync + 'static,
{
    Arc::new(move |event: &FitnessEvent| {
        if let FitnessEvent::StepHistoryChanged {
            start_date,
            end_date,
            steps,
        } = event
        {
            callback(StepHistoryUpdate {
                start_date: *start_date,
                end_date: *end_date,
                steps: *steps,
            });
        }
    })
}

pub(crate) fn authorize_listener<F>(callback: F) -> Listener
where
    F: Fn(AuthorizationUpdate) + Send + Sync + 'static,
{
    Arc::new(move |event: &FitnessEvent| {
        if let FitnessEvent::AuthorizationChanged {
            authorized,
            message,
        } = event
        {
            callback(AuthorizationUpdate {
                authorized: *authorized,
                message: message.clone(),
            });
        }
    })
}
