//! Queue gateway abstraction for fire-and-forget notifications.
//!
//! A [`QueueGateway`] hands out a [`MessageChannel`] bound to the broker; the
//! channel publishes [`QueueMessage`]s under a routing key. Publishing returns as
//! soon as the broker client has accepted the message: the core never waits for
//! a delivery acknowledgment and never retries.
//!
//! # Implementations
//!
//! - `RedpandaQueueGateway` (in `booking-redpanda`): Kafka-compatible producer
//! - `InMemoryQueueGateway` (in `booking-testing`): records messages for assertions
//!
//! # Example
//!
//! ```no_run
//! use booking_core::queue::{publish_message, QueueError, QueueGateway};
//! use serde_json::json;
//!
//! async fn example(gateway: &dyn QueueGateway) -> Result<(), QueueError> {
//!     let channel = gateway.create_channel().await?;
//!     publish_message(channel.as_ref(), "REMINDER_SERVICE", &json!({ "message": "Success" })).await
//! }
//! ```

use crate::error::{Failure, FailureKind};
use http::StatusCode;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by queue gateways and channels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The broker could not be reached or the client could not be created.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The client refused to accept a message.
    #[error("Publish failed for routing key '{routing_key}': {reason}")]
    PublishFailed {
        /// The routing key of the rejected message.
        routing_key: String,
        /// The reason reported by the client.
        reason: String,
    },

    /// The payload could not be serialized.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

impl From<QueueError> for Failure {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::ConnectionFailed(reason) => Self::broker(reason),
            QueueError::PublishFailed { routing_key, reason } => Self::broker(format!(
                "Message for '{routing_key}' was not accepted: {reason}"
            )),
            QueueError::SerializationFailed(reason) => Self::app(
                FailureKind::Repository,
                "Cannot publish message",
                reason,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }
}

/// A single notification: routing key plus serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    routing_key: String,
    payload: Vec<u8>,
}

impl QueueMessage {
    /// Create a message from raw payload bytes.
    #[must_use]
    pub fn new(routing_key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            routing_key: routing_key.into(),
            payload,
        }
    }

    /// Create a message whose payload is `payload` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::SerializationFailed`] if `payload` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(
        routing_key: impl Into<String>,
        payload: &T,
    ) -> Result<Self, QueueError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| QueueError::SerializationFailed(e.to_string()))?;
        Ok(Self::new(routing_key, bytes))
    }

    /// The routing key the broker uses to direct this message.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// The serialized payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decode the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoding error if the payload is not valid JSON.
    pub fn payload_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// A logical connection context used to publish messages.
///
/// Channels are shared across concurrent publishes; implementations must be
/// safe to call from many tasks at once.
pub trait MessageChannel: Send + Sync {
    /// Hand one message to the broker client.
    ///
    /// Resolves once the client has accepted the message, not once the broker
    /// has acknowledged it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::PublishFailed`] if the client refuses the message.
    fn publish(
        &self,
        message: QueueMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), QueueError>> + Send + '_>>;
}

/// Source of broker channels.
///
/// # Dyn Compatibility
///
/// Uses explicit `Pin<Box<dyn Future>>` returns so the workflow can hold an
/// `Arc<dyn QueueGateway>`.
pub trait QueueGateway: Send + Sync {
    /// Establish a channel to the broker, or reuse the one already established.
    ///
    /// Concurrent first calls must perform at most one connection setup.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ConnectionFailed`] if the broker is unreachable.
    fn create_channel(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn MessageChannel>, QueueError>> + Send + '_>>;
}

/// Serialize `payload` as JSON and publish it on `channel` under `routing_key`.
///
/// # Errors
///
/// - [`QueueError::SerializationFailed`] if `payload` cannot be serialized
/// - [`QueueError::PublishFailed`] if the channel refuses the message
pub async fn publish_message<T: Serialize + Sync + ?Sized>(
    channel: &dyn MessageChannel,
    routing_key: &str,
    payload: &T,
) -> Result<(), QueueError> {
    let message = QueueMessage::json(routing_key, payload)?;
    tracing::trace!(
        routing_key = %routing_key,
        bytes = message.payload().len(),
        "Publishing message"
    );
    channel.publish(message).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_message_round_trips_payload() {
        let message = QueueMessage::json("REMINDER_SERVICE", &json!({ "message": "Success" })).unwrap();
        assert_eq!(message.routing_key(), "REMINDER_SERVICE");
        assert_eq!(message.payload(), br#"{"message":"Success"}"#);
        assert_eq!(message.payload_json().unwrap(), json!({ "message": "Success" }));
    }

    #[test]
    fn connection_errors_become_broker_failures() {
        let failure = Failure::from(QueueError::ConnectionFailed("refused".into()));
        assert_eq!(failure.kind(), FailureKind::Broker);
        assert_eq!(failure.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(failure.explanation(), "refused");
    }

    #[test]
    fn publish_error_display_names_routing_key() {
        let err = QueueError::PublishFailed {
            routing_key: "REMINDER_SERVICE".into(),
            reason: "queue full".into(),
        };
        assert!(err.to_string().contains("REMINDER_SERVICE"));
        assert_eq!(Failure::from(err).kind(), FailureKind::Broker);
    }
}
