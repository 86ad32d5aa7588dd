//! Booking service.
//!
//! Thin business layer over a [`BookingStore`]. Every call delegates to the
//! store and propagates its [`Failure`] unchanged.

use crate::booking::{Booking, BookingData, BookingId};
use crate::error::Failure;
use crate::store::{not_found, BookingStore};
use std::sync::Arc;

/// Business-level booking operations.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
}

impl BookingService {
    /// Create a service backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Create a booking from caller data.
    ///
    /// # Errors
    ///
    /// Propagates the store's `ValidationError` or `RepositoryError`.
    #[tracing::instrument(skip(self, data), fields(field_count = data.len()))]
    pub async fn create_booking(&self, data: BookingData) -> Result<Booking, Failure> {
        self.store.create(data).await
    }

    /// Apply a partial update to an existing booking.
    ///
    /// # Errors
    ///
    /// Propagates the store's `NotFoundError`, `ValidationError` or `RepositoryError`.
    #[tracing::instrument(skip(self, data), fields(booking_id = %id))]
    pub async fn update_booking(&self, id: BookingId, data: BookingData) -> Result<Booking, Failure> {
        self.store.update(id, data).await
    }

    /// Fetch a booking by identifier.
    ///
    /// # Errors
    ///
    /// - `NotFoundError` (404) when no booking has that identifier
    /// - `RepositoryError` (500) when the lookup fails
    #[tracing::instrument(skip(self), fields(booking_id = %id))]
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, Failure> {
        self.store.find(id).await?.ok_or_else(|| not_found(id))
    }
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService").finish_non_exhaustive()
    }
}
