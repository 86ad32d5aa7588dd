//! # Booking Testing
//!
//! Testing utilities and helpers for the booking service.
//!
//! This crate provides:
//! - In-memory implementations of the store and queue traits
//! - A fixed clock for deterministic timestamps
//! - Fixtures and a harness that wires a complete workflow
//!
//! ## Example
//!
//! ```
//! use booking_testing::{fixtures, BookingHarness};
//!
//! # async fn example() {
//! let harness = BookingHarness::new();
//! let booking = harness.workflow.create_booking(fixtures::valid_booking_data()).await;
//! assert!(booking.is_ok());
//! assert_eq!(harness.store.len(), 1);
//! # }
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test support: poisoned locks abort the test

use booking_core::environment::Clock;
use chrono::{DateTime, Utc};

mod booking_mocks;
mod queue_mocks;

pub use booking_mocks::InMemoryBookingStore;
pub use queue_mocks::{InMemoryChannel, InMemoryQueueGateway};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use booking_testing::mocks::FixedClock;
    /// use booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Booking data fixtures.
pub mod fixtures {
    use booking_core::booking::BookingData;
    use serde_json::{Value, json};

    /// Convert a JSON object literal into [`BookingData`].
    ///
    /// Non-object values yield empty data.
    #[must_use]
    pub fn booking_data(value: Value) -> BookingData {
        match value {
            Value::Object(map) => map,
            _ => BookingData::new(),
        }
    }

    /// `{customerName: "Alice", roomId: 12, date: "2024-05-01"}`
    #[must_use]
    pub fn valid_booking_data() -> BookingData {
        booking_data(json!({
            "customerName": "Alice",
            "roomId": 12,
            "date": "2024-05-01",
        }))
    }

    /// Data missing every required field.
    #[must_use]
    pub fn invalid_booking_data() -> BookingData {
        BookingData::new()
    }
}

/// Test helpers and utilities
pub mod helpers {
    use crate::{InMemoryBookingStore, InMemoryQueueGateway};
    use booking_core::service::BookingService;
    use booking_core::workflow::{BookingWorkflow, DEFAULT_REMINDER_ROUTING_KEY};
    use std::sync::Arc;

    /// A workflow wired to in-memory doubles, with handles to both.
    #[derive(Debug, Clone)]
    pub struct BookingHarness {
        /// The store behind the workflow.
        pub store: InMemoryBookingStore,
        /// The gateway behind the workflow.
        pub gateway: InMemoryQueueGateway,
        /// The workflow under test.
        pub workflow: BookingWorkflow,
    }

    impl BookingHarness {
        /// Wire fresh doubles with the default reminder routing key.
        #[must_use]
        pub fn new() -> Self {
            Self::with_routing_key(DEFAULT_REMINDER_ROUTING_KEY)
        }

        /// Wire fresh doubles with a custom reminder routing key.
        #[must_use]
        pub fn with_routing_key(routing_key: &str) -> Self {
            let store = InMemoryBookingStore::new();
            let gateway = InMemoryQueueGateway::new();
            let workflow = BookingWorkflow::new(
                BookingService::new(Arc::new(store.clone())),
                Arc::new(gateway.clone()),
                routing_key,
            );
            Self {
                store,
                gateway,
                workflow,
            }
        }
    }

    impl Default for BookingHarness {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Install a test-friendly tracing subscriber.
    ///
    /// Safe to call from every test; only the first call installs anything.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::{BookingHarness, init_tracing};
pub use mocks::{FixedClock, test_clock};
