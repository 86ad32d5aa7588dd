//! In-memory queue gateway that records published messages.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use booking_core::queue::{MessageChannel, QueueError, QueueGateway, QueueMessage};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// In-memory [`QueueGateway`].
///
/// Like the production gateway, the channel is created once, lazily, and shared.
/// Clones share the channel, the recorded messages and the failure toggles.
///
/// # Example
///
/// ```
/// use booking_core::queue::{publish_message, QueueGateway};
/// use booking_testing::InMemoryQueueGateway;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), booking_core::QueueError> {
/// let gateway = InMemoryQueueGateway::new();
/// let channel = gateway.create_channel().await?;
/// publish_message(channel.as_ref(), "REMINDER_SERVICE", &json!({ "message": "Success" })).await?;
///
/// assert_eq!(gateway.messages_for("REMINDER_SERVICE").len(), 1);
/// assert_eq!(gateway.channel_setups(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueueGateway {
    channel: Arc<OnceCell<Arc<InMemoryChannel>>>,
    setups: Arc<AtomicUsize>,
    unreachable: Arc<AtomicBool>,
    messages: Arc<Mutex<Vec<QueueMessage>>>,
    rejecting: Arc<AtomicBool>,
}

impl InMemoryQueueGateway {
    /// Create a reachable gateway with no recorded messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate (or end) an unreachable broker; channel setup fails while set.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make (or stop making) every publish fail as if the client queue were full.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// How many times a channel was actually set up.
    #[must_use]
    pub fn channel_setups(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    /// Every message published so far, in publish order.
    #[must_use]
    pub fn messages(&self) -> Vec<QueueMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Messages published under `routing_key`.
    #[must_use]
    pub fn messages_for(&self, routing_key: &str) -> Vec<QueueMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.routing_key() == routing_key)
            .cloned()
            .collect()
    }

    /// Forget recorded messages.
    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl std::fmt::Debug for InMemoryQueueGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQueueGateway")
            .field("channel_setups", &self.channel_setups())
            .field("messages", &self.messages.lock().unwrap().len())
            .field("unreachable", &self.unreachable.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl QueueGateway for InMemoryQueueGateway {
    fn create_channel(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn MessageChannel>, QueueError>> + Send + '_>> {
        Box::pin(async move {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(QueueError::ConnectionFailed(
                    "in-memory broker is unreachable".to_string(),
                ));
            }

            let channel = self
                .channel
                .get_or_init(|| async {
                    self.setups.fetch_add(1, Ordering::SeqCst);
                    // Give concurrent callers a chance to race the setup.
                    tokio::task::yield_now().await;
                    Arc::new(InMemoryChannel {
                        messages: Arc::clone(&self.messages),
                        rejecting: Arc::clone(&self.rejecting),
                    })
                })
                .await;

            Ok(Arc::clone(channel) as Arc<dyn MessageChannel>)
        })
    }
}

/// Channel handed out by [`InMemoryQueueGateway`].
#[derive(Debug)]
pub struct InMemoryChannel {
    messages: Arc<Mutex<Vec<QueueMessage>>>,
    rejecting: Arc<AtomicBool>,
}

impl MessageChannel for InMemoryChannel {
    fn publish(
        &self,
        message: QueueMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), QueueError>> + Send + '_>> {
        Box::pin(async move {
            if self.rejecting.load(Ordering::SeqCst) {
                return Err(QueueError::PublishFailed {
                    routing_key: message.routing_key().to_string(),
                    reason: "Queue full".to_string(),
                });
            }
            self.messages.lock().unwrap().push(message);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::queue::publish_message;
    use serde_json::json;

    #[tokio::test]
    async fn channel_is_set_up_once() {
        let gateway = InMemoryQueueGateway::new();
        let first = gateway.create_channel().await.unwrap();
        let second = gateway.create_channel().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gateway.channel_setups(), 1);
    }

    #[tokio::test]
    async fn unreachable_broker_recovers() {
        let gateway = InMemoryQueueGateway::new();
        gateway.set_unreachable(true);
        assert!(gateway.create_channel().await.is_err());
        assert_eq!(gateway.channel_setups(), 0);

        gateway.set_unreachable(false);
        assert!(gateway.create_channel().await.is_ok());
    }

    #[tokio::test]
    async fn rejected_publish_is_not_recorded() {
        let gateway = InMemoryQueueGateway::new();
        let channel = gateway.create_channel().await.unwrap();
        gateway.set_rejecting(true);

        let result = publish_message(channel.as_ref(), "REMINDER_SERVICE", &json!({})).await;
        assert!(matches!(result, Err(QueueError::PublishFailed { .. })));
        assert!(gateway.messages().is_empty());
    }
}
