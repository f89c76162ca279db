//! Dual-callback reply adapter.
//!
//! Most mobile fitness SDKs report completion through two callbacks, one for
//! failure and one for success. [`reply_channel`] turns that pair into a
//! single future so a host can implement the async
//! [`FitnessCapability`](crate::fitness::FitnessCapability) methods on top of
//! a callback SDK:
//!
//! ```ignore
//! async fn is_enabled(&self) -> Result<bool> {
//!     let (reply, pending) = reply_channel();
//!     let (on_error, on_success) = reply.into_callbacks();
//!     self.sdk.is_enabled(on_error, on_success);
//!     pending.await
//! }
//! ```

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use crate::error::{BridgeError, Result};

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T>>>>>;

/// Create a linked reply handle and pending future.
pub fn reply_channel<T>() -> (NativeReply<T>, PendingReply<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        NativeReply {
            slot: Arc::new(Mutex::new(Some(sender))),
        },
        PendingReply { receiver },
    )
}

/// Completion side handed to the host SDK. The first outcome wins; later
/// calls are ignored.
pub struct NativeReply<T> {
    slot: Slot<T>,
}

impl<T> Clone for NativeReply<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> NativeReply<T> {
    /// Resolve with the host's failure message.
    pub fn on_error(&self, message: impl Into<String>) -> bool {
        self.resolve(Err(BridgeError::OperationFailed(message.into())))
    }

    /// Resolve with the host's success payload.
    pub fn on_success(&self, value: T) -> bool {
        self.resolve(Ok(value))
    }

    /// Whether an outcome has already been delivered.
    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn resolve(&self, outcome: Result<T>) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        }
    }
}

impl<T: Send + 'static> NativeReply<T> {
    /// Split into the `(on_error, on_success)` pair SDKs expect.
    pub fn into_callbacks(
        self,
    ) -> (
        impl FnOnce(String) + Send + 'static,
        impl FnOnce(T) + Send + 'static,
    ) {
        let error_side = self.clone();
        let success_side = self;
        (
            move |message: String| {
                error_side.on_error(message);
            },
            move |value: T| {
                success_side.on_success(value);
            },
        )
    }
}

/// Future resolving to the host's outcome.
///
/// If every [`NativeReply`] is dropped without an outcome the future resolves
/// to [`BridgeError::NotAvailable`].
pub struct PendingReply<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> Future for PendingReply<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(BridgeError::NotAvailable(
                "host dropped the reply without answering".to_string(),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_callback_resolves() {
        let (reply, pending) = reply_channel::<bool>();
        let (_on_error, on_success) = reply.into_callbacks();

        on_success(true);

        assert_eq!(pending.await, Ok(true));
    }

    #[tokio::test]
    async fn test_error_callback_passes_message_verbatim() {
        let (reply, pending) = reply_channel::<bool>();
        let (on_error, _on_success) = reply.into_callbacks();

        on_error("Google Fit is not installed".to_string());

        assert_eq!(
            pending.await,
            Err(BridgeError::OperationFailed(
                "Google Fit is not installed".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_first_outcome_wins() {
        let (reply, pending) = reply_channel::<u32>();
        let other = reply.clone();

        assert!(reply.on_success(1));
        assert!(other.is_resolved());
        assert!(!other.on_error("late failure"));

        assert_eq!(pending.await, Ok(1));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_not_available() {
        let (reply, pending) = reply_channel::<()>();
        drop(reply);

        assert!(matches!(pending.await, Err(BridgeError::NotAvailable(_))));
    }
}
