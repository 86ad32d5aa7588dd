//! In-memory booking store for fast, deterministic tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use crate::mocks::test_clock;
use booking_core::booking::{Booking, BookingData, BookingId};
use booking_core::environment::Clock;
use booking_core::error::Failure;
use booking_core::schema::BookingSchema;
use booking_core::store::{create_failed, fetch_failed, not_found, update_failed, BookingStore};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory [`BookingStore`].
///
/// Validates against the same [`BookingSchema`] as the production store and
/// assigns strictly increasing identifiers starting at 1. Clones share state.
///
/// Call [`set_unavailable`](Self::set_unavailable) to simulate a datastore outage:
/// every operation then fails with the store's `RepositoryError`.
///
/// # Example
///
/// ```
/// use booking_core::store::BookingStore;
/// use booking_testing::{fixtures, InMemoryBookingStore};
///
/// # async fn example() -> Result<(), booking_core::Failure> {
/// let store = InMemoryBookingStore::new();
/// let booking = store.create(fixtures::valid_booking_data()).await?;
/// assert_eq!(booking.id.get(), 1);
/// assert!(store.find(booking.id).await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<BTreeMap<BookingId, Booking>>>,
    next_id: Arc<AtomicI64>,
    unavailable: Arc<AtomicBool>,
    schema: BookingSchema,
    clock: Arc<dyn Clock>,
}

impl InMemoryBookingStore {
    /// Create an empty store with the default schema and [`test_clock`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            bookings: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            unavailable: Arc::new(AtomicBool::new(false)),
            schema: BookingSchema::default(),
            clock: Arc::new(test_clock()),
        }
    }

    /// Replace the validation schema.
    #[must_use]
    pub fn with_schema(mut self, schema: BookingSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Replace the clock used for timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Simulate (or end) a datastore outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.read().unwrap().len()
    }

    /// Whether no booking is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bookings.read().unwrap().is_empty()
    }

    /// Snapshot of a stored booking, bypassing the trait.
    #[must_use]
    pub fn get(&self, id: BookingId) -> Option<Booking> {
        self.bookings.read().unwrap().get(&id).cloned()
    }

    /// Every stored booking, in identifier order.
    #[must_use]
    pub fn all(&self) -> Vec<Booking> {
        self.bookings.read().unwrap().values().cloned().collect()
    }

    /// Remove every booking (identifiers keep increasing).
    pub fn clear(&self) {
        self.bookings.write().unwrap().clear();
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }

    fn insert(&self, data: &BookingData) -> Result<Booking, Failure> {
        let fields = self.schema.validate(data)?;
        if self.is_unavailable() {
            return Err(create_failed());
        }

        let id = BookingId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let now = self.clock.now();
        let booking = Booking::new(id, fields, now, now);
        self.bookings.write().unwrap().insert(id, booking.clone());
        Ok(booking)
    }

    fn apply_update(&self, id: BookingId, patch: &BookingData) -> Result<Booking, Failure> {
        self.schema.validate_partial(patch)?;
        if self.is_unavailable() {
            return Err(update_failed());
        }

        let mut bookings = self.bookings.write().unwrap();
        let current = bookings.get(&id).ok_or_else(|| not_found(id))?;
        let fields = self.schema.validate(&current.merged_fields(patch))?;

        let updated = Booking::new(id, fields, current.created_at, self.clock.now());
        bookings.insert(id, updated.clone());
        Ok(updated)
    }

    fn select(&self, id: BookingId) -> Result<Option<Booking>, Failure> {
        if self.is_unavailable() {
            return Err(fetch_failed());
        }
        Ok(self.get(id))
    }
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBookingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBookingStore")
            .field("len", &self.len())
            .field("unavailable", &self.is_unavailable())
            .finish_non_exhaustive()
    }
}

impl BookingStore for InMemoryBookingStore {
    fn create(
        &self,
        data: BookingData,
    ) -> Pin<Box<dyn Future<Output = Result<Booking, Failure>> + Send + '_>> {
        Box::pin(async move { self.insert(&data) })
    }

    fn update(
        &self,
        id: BookingId,
        data: BookingData,
    ) -> Pin<Box<dyn Future<Output = Result<Booking, Failure>> + Send + '_>> {
        Box::pin(async move { self.apply_update(id, &data) })
    }

    fn find(
        &self,
        id: BookingId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Booking>, Failure>> + Send + '_>> {
        Box::pin(async move { self.select(id) })
    }
}
