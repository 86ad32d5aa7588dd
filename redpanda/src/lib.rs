//! Redpanda queue gateway for the booking service.
//!
//! This crate provides [`RedpandaQueueGateway`], the production implementation of
//! the `QueueGateway` trait from `booking-core`. It uses rdkafka, so any
//! Kafka-compatible broker works (Redpanda, Apache Kafka, MSK, ...).
//!
//! # Routing
//!
//! The routing key of a message is the Kafka topic it is produced to. The
//! reminder broadcast therefore lands on the topic named by the configured
//! reminder routing key.
//!
//! # Delivery Semantics
//!
//! **Fire-and-forget**:
//! - `publish` returns as soon as librdkafka has queued the message
//! - The delivery report is logged by a background task and never awaited
//! - Nothing is retried by this crate; librdkafka gives up after `message.timeout.ms`
//!
//! # Channel Lifecycle
//!
//! The producer is created lazily by the first `create_channel` call and shared
//! by every later call. Setup fetches cluster metadata to prove at least one broker
//! answers. Setup attempts are serialized, so after a failed probe the error is
//! remembered for the retry backoff: callers queued behind the failed attempt, and
//! any caller inside the backoff window, get that error immediately instead of
//! each waiting out its own probe.
//!
//! # Example
//!
//! ```no_run
//! use booking_core::queue::{publish_message, QueueGateway};
//! use booking_redpanda::RedpandaQueueGateway;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = RedpandaQueueGateway::new("localhost:9092")?;
//! let channel = gateway.create_channel().await?;
//! publish_message(channel.as_ref(), "REMINDER_SERVICE", &json!({ "message": "Success" })).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use booking_core::queue::{MessageChannel, QueueError, QueueGateway, QueueMessage};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

const DEFAULT_ACKS: &str = "1";
const DEFAULT_COMPRESSION: &str = "none";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Redpanda-backed [`QueueGateway`].
///
/// # Configuration
///
/// - **Broker addresses**: Bootstrap servers (required)
/// - **Producer settings**: Acks, compression
/// - **Timeout**: Bounds the connectivity probe and each message's delivery
///
/// # Example
///
/// ```no_run
/// use booking_redpanda::RedpandaQueueGateway;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = RedpandaQueueGateway::builder()
///     .brokers("localhost:9092,localhost:9093")
///     .producer_acks("all")
///     .compression("lz4")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct RedpandaQueueGateway {
    /// Broker addresses
    brokers: String,
    /// Producer acknowledgment mode
    acks: String,
    /// Compression codec
    compression: String,
    /// Probe and delivery timeout
    timeout: Duration,
    /// How long a failed setup is reported without probing again
    retry_backoff: Duration,
    /// Channel created by the first successful setup
    channel: OnceCell<Arc<RedpandaChannel>>,
    /// Most recent failed setup
    last_failure: Mutex<Option<(Instant, QueueError)>>,
}

impl RedpandaQueueGateway {
    /// Create a gateway with default producer settings.
    ///
    /// No connection is made until the first channel is requested.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ConnectionFailed`] if `brokers` is empty.
    pub fn new(brokers: &str) -> Result<Self, QueueError> {
        Self::builder().brokers(brokers).build()
    }

    /// Create a new builder for configuring the gateway.
    #[must_use]
    pub fn builder() -> RedpandaQueueGatewayBuilder {
        RedpandaQueueGatewayBuilder::default()
    }

    /// Get a reference to the brokers string.
    #[must_use]
    pub fn brokers(&self) -> &str {
        &self.brokers
    }

    /// Whether a channel has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.channel.initialized()
    }

    fn recent_failure(&self) -> Option<QueueError> {
        let last_failure = self.last_failure.lock().unwrap_or_else(PoisonError::into_inner);
        last_failure
            .as_ref()
            .filter(|(failed_at, _)| failed_at.elapsed() < self.retry_backoff)
            .map(|(_, err)| err.clone())
    }

    fn remember_failure(&self, err: &QueueError) {
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((Instant::now(), err.clone()));
    }

    async fn setup(&self) -> Result<Arc<RedpandaChannel>, QueueError> {
        if let Some(err) = self.recent_failure() {
            tracing::debug!(error = %err, "Broker setup failed recently, not probing again");
            return Err(err);
        }

        let result = self.connect().await;
        if let Err(err) = &result {
            self.remember_failure(err);
        }
        result
    }

    #[tracing::instrument(skip(self), fields(brokers = %self.brokers))]
    async fn connect(&self) -> Result<Arc<RedpandaChannel>, QueueError> {
        let timeout_ms = self.timeout.as_millis().to_string();

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("message.timeout.ms", &timeout_ms)
            .set("acks", &self.acks)
            .set("compression.type", &self.compression)
            .create()
            .map_err(|e| QueueError::ConnectionFailed(format!("Failed to create producer: {e}")))?;

        // fetch_metadata blocks the calling thread
        let probe = producer.clone();
        let timeout = self.timeout;
        let broker_count = tokio::task::spawn_blocking(move || {
            probe
                .client()
                .fetch_metadata(None, Timeout::After(timeout))
                .map(|metadata| metadata.brokers().len())
        })
        .await
        .map_err(|e| QueueError::ConnectionFailed(format!("Broker probe aborted: {e}")))?
        .map_err(|e| {
            tracing::warn!(error = %e, "Message broker unreachable");
            QueueError::ConnectionFailed(format!("Cannot reach brokers at {}: {e}", self.brokers))
        })?;

        metrics::counter!("broker_channel_setups_total").increment(1);
        tracing::info!(
            broker_count,
            acks = %self.acks,
            compression = %self.compression,
            "Broker channel established"
        );

        Ok(Arc::new(RedpandaChannel { producer }))
    }
}

impl std::fmt::Debug for RedpandaQueueGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedpandaQueueGateway")
            .field("brokers", &self.brokers)
            .field("acks", &self.acks)
            .field("compression", &self.compression)
            .field("timeout", &self.timeout)
            .field("retry_backoff", &self.retry_backoff)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl QueueGateway for RedpandaQueueGateway {
    fn create_channel(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn MessageChannel>, QueueError>> + Send + '_>> {
        Box::pin(async move {
            let channel = self.channel.get_or_try_init(|| self.setup()).await?;
            Ok(Arc::clone(channel) as Arc<dyn MessageChannel>)
        })
    }
}

/// Builder for configuring a [`RedpandaQueueGateway`].
#[derive(Default)]
pub struct RedpandaQueueGatewayBuilder {
    brokers: Option<String>,
    producer_acks: Option<String>,
    compression: Option<String>,
    timeout: Option<Duration>,
    retry_backoff: Option<Duration>,
}

impl RedpandaQueueGatewayBuilder {
    /// Set the broker addresses.
    ///
    /// # Parameters
    ///
    /// - `brokers`: Comma-separated list of broker addresses (e.g., "localhost:9092")
    #[must_use]
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.brokers = Some(brokers.into());
        self
    }

    /// Set the producer acknowledgment mode.
    ///
    /// # Parameters
    ///
    /// - `acks`: "0" (no acks), "1" (leader ack), "all" (all replicas ack)
    ///
    /// Default: "1"
    #[must_use]
    pub fn producer_acks(mut self, acks: impl Into<String>) -> Self {
        self.producer_acks = Some(acks.into());
        self
    }

    /// Set the compression codec.
    ///
    /// # Parameters
    ///
    /// - `compression`: "none", "gzip", "snappy", "lz4", "zstd"
    ///
    /// Default: "none"
    #[must_use]
    pub fn compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// Set the probe and delivery timeout.
    ///
    /// Default: 5 seconds
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how long a failed channel setup is reported without probing again.
    ///
    /// Default: 1 second
    #[must_use]
    pub const fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = Some(retry_backoff);
        self
    }

    /// Build the [`RedpandaQueueGateway`].
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ConnectionFailed`] if brokers are not set.
    pub fn build(self) -> Result<RedpandaQueueGateway, QueueError> {
        let brokers = self
            .brokers
            .filter(|brokers| !brokers.trim().is_empty())
            .ok_or_else(|| QueueError::ConnectionFailed("Brokers not configured".to_string()))?;

        let gateway = RedpandaQueueGateway {
            brokers,
            acks: self.producer_acks.unwrap_or_else(|| DEFAULT_ACKS.to_string()),
            compression: self
                .compression
                .unwrap_or_else(|| DEFAULT_COMPRESSION.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry_backoff: self.retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF),
            channel: OnceCell::new(),
            last_failure: Mutex::new(None),
        };

        tracing::info!(
            brokers = %gateway.brokers,
            acks = %gateway.acks,
            compression = %gateway.compression,
            timeout_ms = gateway.timeout.as_millis(),
            "RedpandaQueueGateway configured"
        );

        Ok(gateway)
    }
}

/// A channel backed by a shared `FutureProducer`.
pub struct RedpandaChannel {
    producer: FutureProducer,
}

impl MessageChannel for RedpandaChannel {
    fn publish(
        &self,
        message: QueueMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), QueueError>> + Send + '_>> {
        Box::pin(async move {
            let routing_key = message.routing_key().to_string();
            let record = FutureRecord::<(), [u8]>::to(message.routing_key()).payload(message.payload());

            match self.producer.send_result(record) {
                Ok(delivery) => {
                    let topic = routing_key.clone();
                    tokio::spawn(async move {
                        match delivery.await {
                            Ok(Ok((partition, offset))) => tracing::debug!(
                                topic = %topic,
                                partition,
                                offset,
                                "Message delivered"
                            ),
                            Ok(Err((kafka_error, _))) => tracing::warn!(
                                topic = %topic,
                                error = %kafka_error,
                                "Message delivery failed"
                            ),
                            Err(_) => tracing::warn!(
                                topic = %topic,
                                "Producer dropped before delivery report"
                            ),
                        }
                    });
                    tracing::trace!(topic = %routing_key, "Message queued");
                    Ok(())
                },
                Err((kafka_error, _)) => {
                    tracing::error!(
                        topic = %routing_key,
                        error = %kafka_error,
                        "Failed to queue message"
                    );
                    Err(QueueError::PublishFailed {
                        routing_key,
                        reason: kafka_error.to_string(),
                    })
                },
            }
        })
    }
}
