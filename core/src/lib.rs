//! # Booking Core
//!
//! Core types and traits for the booking service.
//!
//! This crate holds everything that does not depend on a particular datastore,
//! broker or transport: the failure taxonomy, the booking model and schema, the
//! store and queue traits, the booking service and the workflow that composes them.
//!
//! ## Components
//!
//! - **Failure** ([`error`]): typed failures with a kind, message, explanation and status hint
//! - **Booking** ([`booking`]): the persisted reservation record
//! - **Schema** ([`schema`]): field rules applied by stores before writing
//! - **Store** ([`store`]): persistence trait; stores translate their own errors
//! - **Queue** ([`queue`]): broker channel trait for fire-and-forget notifications
//! - **Service** ([`service`]): business layer over the store
//! - **Workflow** ([`workflow`]): create-booking and trigger-reminder-broadcast
//!
//! ## Architecture Principles
//!
//! - Dependencies are injected explicitly (`Arc<dyn BookingStore>`, `Arc<dyn QueueGateway>`)
//! - Errors are translated once, at the component that produced them
//! - No retries anywhere in the core
//!
//! ## Example
//!
//! ```ignore
//! use booking_core::{BookingService, BookingWorkflow};
//! use std::sync::Arc;
//!
//! let store = Arc::new(PostgresBookingStore::new(&database_url).await?);
//! let gateway = Arc::new(RedpandaQueueGateway::new("localhost:9092")?);
//!
//! let workflow = BookingWorkflow::new(BookingService::new(store), gateway, "REMINDER_SERVICE");
//! let booking = workflow.create_booking(data).await?;
//! workflow.trigger_reminder_broadcast().await?;
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod booking;
pub mod error;
pub mod queue;
pub mod schema;
pub mod service;
pub mod store;
pub mod workflow;

pub use booking::{Booking, BookingData, BookingId};
pub use error::{Failure, FailureKind};
pub use queue::{MessageChannel, QueueError, QueueGateway, QueueMessage};
pub use schema::{BookingSchema, SchemaError};
pub use service::BookingService;
pub use store::BookingStore;
pub use workflow::{BookingReply, BookingWorkflow, BroadcastReply};

/// Environment module - Dependency injection traits
///
/// Stores take their timestamps from a [`Clock`](environment::Clock) so tests
/// can pin time.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use booking_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// assert!(clock.now() <= chrono::Utc::now());
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
