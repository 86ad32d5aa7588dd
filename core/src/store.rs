//! Booking store trait.
//!
//! The store is the only component that talks to the datastore. It validates
//! incoming data against its [`BookingSchema`](crate::schema::BookingSchema),
//! performs exactly one write per call, and translates every low-level error into
//! a [`Failure`] before returning. It never retries.
//!
//! # Implementations
//!
//! - `PostgresBookingStore` (in `booking-postgres`): production storage
//! - `InMemoryBookingStore` (in `booking-testing`): fast, deterministic tests
//!
//! # Example
//!
//! ```no_run
//! use booking_core::booking::BookingData;
//! use booking_core::error::Failure;
//! use booking_core::store::BookingStore;
//! use serde_json::json;
//!
//! async fn example<S: BookingStore>(store: &S) -> Result<(), Failure> {
//!     let data: BookingData = json!({ "customerName": "Alice", "roomId": 12, "date": "2024-05-01" })
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default();
//!
//!     let booking = store.create(data).await?;
//!     let fetched = store.find(booking.id).await?;
//!     assert_eq!(fetched.map(|b| b.id), Some(booking.id));
//!     Ok(())
//! }
//! ```

use crate::booking::{Booking, BookingData, BookingId};
use crate::error::{Failure, FailureKind};
use http::StatusCode;
use std::future::Future;
use std::pin::Pin;

/// Failure returned when a create fails for a reason other than validation.
#[must_use]
pub fn create_failed() -> Failure {
    Failure::app(
        FailureKind::Repository,
        "Cannot create booking",
        "There was an issue creating the booking, please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

/// Failure returned when an update fails for a reason other than validation.
#[must_use]
pub fn update_failed() -> Failure {
    Failure::app(
        FailureKind::Repository,
        "Cannot update booking",
        "There was an issue updating the booking, please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

/// Failure returned when a lookup fails.
#[must_use]
pub fn fetch_failed() -> Failure {
    Failure::app(
        FailureKind::Repository,
        "Cannot fetch booking",
        "There was an issue fetching the booking, please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

/// Failure returned when no booking has the requested identifier.
#[must_use]
pub fn not_found(id: BookingId) -> Failure {
    Failure::app(
        FailureKind::NotFound,
        "Booking not found",
        format!("No booking exists with id {id}"),
        StatusCode::NOT_FOUND,
    )
}

/// Storage for bookings.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one instance is shared by every request.
///
/// # Dyn Compatibility
///
/// Methods return `Pin<Box<dyn Future>>` so the store can be held as
/// `Arc<dyn BookingStore>` and injected into the service.
pub trait BookingStore: Send + Sync {
    /// Validate and persist `data` as a new booking.
    ///
    /// # Errors
    ///
    /// - `ValidationError` (400) when `data` violates the schema or a database constraint
    /// - `RepositoryError` (500, "Cannot create booking") for any other storage failure
    fn create(
        &self,
        data: BookingData,
    ) -> Pin<Box<dyn Future<Output = Result<Booking, Failure>> + Send + '_>>;

    /// Merge `data` over an existing booking, validate the result and persist it.
    ///
    /// `null` values in `data` remove optional fields.
    ///
    /// # Errors
    ///
    /// - `NotFoundError` (404) when `id` does not exist
    /// - `ValidationError` (400) when the merged record violates the schema
    /// - `RepositoryError` (500, "Cannot update booking") for any other storage failure
    fn update(
        &self,
        id: BookingId,
        data: BookingData,
    ) -> Pin<Box<dyn Future<Output = Result<Booking, Failure>> + Send + '_>>;

    /// Load a booking by identifier.
    ///
    /// Returns `None` when no booking has that identifier.
    ///
    /// # Errors
    ///
    /// - `RepositoryError` (500, "Cannot fetch booking") when the lookup fails
    fn find(
        &self,
        id: BookingId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Booking>, Failure>> + Send + '_>>;
}
