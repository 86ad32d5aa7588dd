//! Booking workflow.
//!
//! The orchestrator behind the two public operations:
//!
//! - **create-booking**: persists caller data through the [`BookingService`]
//! - **trigger-reminder-broadcast**: publishes a fixed notification through the
//!   [`QueueGateway`] under the configured reminder routing key
//!
//! The two paths are independent: broadcasting never touches the store and
//! creating a booking never touches the broker. Every failure leaving the
//! workflow is a [`Failure`], so transports render both paths the same way.
//!
//! Results are rendered into the response envelopes [`BookingReply`] and
//! [`BroadcastReply`].

use crate::booking::{Booking, BookingData, BookingId};
use crate::error::Failure;
use crate::queue::{publish_message, QueueError, QueueGateway};
use crate::service::BookingService;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Routing key used when none is configured.
pub const DEFAULT_REMINDER_ROUTING_KEY: &str = "REMINDER_SERVICE";

/// Reply message for a successful create.
pub const CREATED_MESSAGE: &str = "Successfully completed booking";

/// Reply message for a successful update.
pub const UPDATED_MESSAGE: &str = "Successfully updated the booking";

/// Reply message for a successful lookup.
pub const FETCHED_MESSAGE: &str = "Successfully fetched the booking";

/// Reply message for a successful broadcast.
pub const PUBLISHED_MESSAGE: &str = "Successfully published the data";

/// Payload published by every reminder broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotification {
    /// Always `"Success"`.
    pub message: String,
}

impl Default for ReminderNotification {
    fn default() -> Self {
        Self {
            message: "Success".to_string(),
        }
    }
}

/// Composes the booking service and the queue gateway.
#[derive(Clone)]
pub struct BookingWorkflow {
    service: BookingService,
    gateway: Arc<dyn QueueGateway>,
    reminder_routing_key: String,
}

impl BookingWorkflow {
    /// Create a workflow.
    #[must_use]
    pub fn new(
        service: BookingService,
        gateway: Arc<dyn QueueGateway>,
        reminder_routing_key: impl Into<String>,
    ) -> Self {
        Self {
            service,
            gateway,
            reminder_routing_key: reminder_routing_key.into(),
        }
    }

    /// The routing key reminder broadcasts are published under.
    #[must_use]
    pub fn reminder_routing_key(&self) -> &str {
        &self.reminder_routing_key
    }

    /// The booking service.
    #[must_use]
    pub const fn service(&self) -> &BookingService {
        &self.service
    }

    /// Create a booking.
    ///
    /// Transitions `Started -> Succeeded | Failed`; each transition is logged.
    ///
    /// # Errors
    ///
    /// Returns the store's [`Failure`] unchanged.
    #[tracing::instrument(skip(self, data), name = "create_booking")]
    pub async fn create_booking(&self, data: BookingData) -> Result<Booking, Failure> {
        tracing::debug!(state = "Started", "Creating booking");

        match self.service.create_booking(data).await {
            Ok(booking) => {
                metrics::counter!("bookings_created_total").increment(1);
                tracing::info!(state = "Succeeded", booking_id = %booking.id, "Booking created");
                Ok(booking)
            },
            Err(failure) => {
                record_failure(Operation::Booking, &failure);
                Err(failure)
            },
        }
    }

    /// Apply a partial update to a booking.
    ///
    /// # Errors
    ///
    /// Returns the store's [`Failure`] unchanged.
    #[tracing::instrument(skip(self, data), name = "update_booking", fields(booking_id = %id))]
    pub async fn update_booking(&self, id: BookingId, data: BookingData) -> Result<Booking, Failure> {
        let result = self.service.update_booking(id, data).await;
        if let Err(failure) = &result {
            record_failure(Operation::Booking, failure);
        }
        result
    }

    /// Fetch a booking.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError` for an unknown id, or the store's [`Failure`].
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, Failure> {
        self.service.get_booking(id).await
    }

    /// Publish one reminder notification under the configured routing key.
    ///
    /// Succeeds once the broker client has accepted the message.
    ///
    /// # Errors
    ///
    /// Returns a `BrokerError` (503) when the broker cannot be reached or refuses
    /// the message.
    #[tracing::instrument(skip(self), name = "trigger_reminder_broadcast", fields(routing_key = %self.reminder_routing_key))]
    pub async fn trigger_reminder_broadcast(&self) -> Result<(), Failure> {
        match self.publish_reminder().await {
            Ok(()) => {
                metrics::counter!("reminders_published_total").increment(1);
                tracing::info!("Reminder broadcast published");
                Ok(())
            },
            Err(err) => {
                let failure = Failure::from(err);
                record_failure(Operation::Reminder, &failure);
                Err(failure)
            },
        }
    }
}

impl BookingWorkflow {
    async fn publish_reminder(&self) -> Result<(), QueueError> {
        let channel = self.gateway.create_channel().await?;
        publish_message(
            channel.as_ref(),
            &self.reminder_routing_key,
            &ReminderNotification::default(),
        )
        .await
    }
}

impl std::fmt::Debug for BookingWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingWorkflow")
            .field("reminder_routing_key", &self.reminder_routing_key)
            .finish_non_exhaustive()
    }
}

/// Which public operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Booking,
    Reminder,
}

impl Operation {
    const fn failure_counter(self) -> &'static str {
        match self {
            Self::Booking => "bookings_failed_total",
            Self::Reminder => "reminders_failed_total",
        }
    }
}

fn record_failure(operation: Operation, failure: &Failure) {
    metrics::counter!(operation.failure_counter(), "kind" => failure.kind().name()).increment(1);
    if failure.is_server_error() {
        tracing::error!(
            state = "Failed",
            kind = %failure.kind(),
            status = failure.status_code().as_u16(),
            explanation = failure.explanation(),
            "{}",
            failure.message()
        );
    } else {
        tracing::warn!(
            state = "Failed",
            kind = %failure.kind(),
            status = failure.status_code().as_u16(),
            explanation = failure.explanation(),
            "{}",
            failure.message()
        );
    }
}

/// An empty JSON object, `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// The `err` member of a [`BookingReply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyError {
    /// The failure explanation.
    Explanation(String),
    /// No error.
    None(Empty),
}

/// The `data` member of a [`BookingReply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyData {
    /// The booking produced by the operation.
    Booking(Box<Booking>),
    /// No data.
    None(Empty),
}

/// Envelope for booking operations.
///
/// ```
/// use booking_core::error::Failure;
/// use booking_core::workflow::BookingReply;
/// use serde_json::json;
///
/// let reply = BookingReply::failure(&Failure::validation("roomId is required"));
/// assert_eq!(
///     serde_json::to_value(&reply).unwrap_or_default(),
///     json!({
///         "message": "Not able to validate the data sent in the request",
///         "success": false,
///         "err": "roomId is required",
///         "data": {},
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingReply {
    /// Human-readable outcome.
    pub message: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// The failure explanation, or `{}`.
    pub err: ReplyError,
    /// The booking, or `{}`.
    pub data: ReplyData,
}

impl BookingReply {
    /// A successful reply carrying `booking`.
    #[must_use]
    pub fn success(message: impl Into<String>, booking: Booking) -> Self {
        Self {
            message: message.into(),
            success: true,
            err: ReplyError::None(Empty {}),
            data: ReplyData::Booking(Box::new(booking)),
        }
    }

    /// A failed reply rendered from `failure`.
    #[must_use]
    pub fn failure(failure: &Failure) -> Self {
        Self {
            message: failure.message().to_string(),
            success: false,
            err: ReplyError::Explanation(failure.explanation().to_string()),
            data: ReplyData::None(Empty {}),
        }
    }

    /// Render an operation result together with its status code.
    #[must_use]
    pub fn from_result(message: &str, result: Result<Booking, Failure>) -> (StatusCode, Self) {
        match result {
            Ok(booking) => (StatusCode::OK, Self::success(message, booking)),
            Err(failure) => (failure.status_code(), Self::failure(&failure)),
        }
    }

    /// The booking, if the reply carries one.
    #[must_use]
    pub fn booking(&self) -> Option<&Booking> {
        match &self.data {
            ReplyData::Booking(booking) => Some(booking.as_ref()),
            ReplyData::None(_) => None,
        }
    }
}

/// Envelope for a successful reminder broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReply {
    /// Always [`PUBLISHED_MESSAGE`].
    pub message: String,
}

impl BroadcastReply {
    /// The reply for a published broadcast.
    #[must_use]
    pub fn published() -> Self {
        Self {
            message: PUBLISHED_MESSAGE.to_string(),
        }
    }
}
