//! Booking data model.
//!
//! A [`Booking`] is the stored form of a reservation request. Its domain fields are
//! opaque to the core: they arrive as a JSON object ([`BookingData`]) and are checked
//! against the store's [`BookingSchema`](crate::schema::BookingSchema) before anything
//! is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Caller-supplied booking fields, keyed by field name.
pub type BookingData = Map<String, Value>;

/// Store-assigned booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(i64);

impl BookingId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A fully persisted booking.
///
/// Serializes as a flat object: the identifier, every recognized domain field, and
/// the store timestamps.
///
/// ```
/// use booking_core::booking::{Booking, BookingId};
/// use chrono::Utc;
/// use serde_json::json;
///
/// let now = Utc::now();
/// let fields = json!({ "customerName": "Alice" }).as_object().cloned().unwrap_or_default();
/// let booking = Booking::new(BookingId::new(1), fields, now, now);
/// let value = serde_json::to_value(&booking).unwrap_or_default();
/// assert_eq!(value["id"], 1);
/// assert_eq!(value["customerName"], "Alice");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Store-assigned identifier.
    pub id: BookingId,
    /// Recognized domain fields.
    #[serde(flatten)]
    pub fields: BookingData,
    /// When the booking was first stored.
    pub created_at: DateTime<Utc>,
    /// When the booking was last written.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Assemble a booking from its stored parts.
    #[must_use]
    pub const fn new(
        id: BookingId,
        fields: BookingData,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            fields,
            created_at,
            updated_at,
        }
    }

    /// Look up a single domain field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Apply `patch` over the stored fields.
    ///
    /// A `null` in the patch removes the field; any other value replaces it.
    /// The result still has to pass schema validation before it is written.
    #[must_use]
    pub fn merged_fields(&self, patch: &BookingData) -> BookingData {
        let mut merged = self.fields.clone();
        for (name, value) in patch {
            if value.is_null() {
                merged.remove(name);
            } else {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> BookingData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn booking_serializes_flat() {
        let now = Utc::now();
        let booking = Booking::new(
            BookingId::new(42),
            data(json!({ "customerName": "Alice", "roomId": 12 })),
            now,
            now,
        );

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["id"], 42);
        assert_eq!(value["customerName"], "Alice");
        assert_eq!(value["roomId"], 12);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("fields").is_none());

        let back: Booking = serde_json::from_value(value).unwrap();
        assert_eq!(back, booking);
    }

    #[test]
    fn merge_replaces_and_removes() {
        let now = Utc::now();
        let booking = Booking::new(
            BookingId::new(1),
            data(json!({ "customerName": "Alice", "notes": "late arrival" })),
            now,
            now,
        );

        let merged = booking.merged_fields(&data(json!({ "customerName": "Bob", "notes": null })));
        assert_eq!(merged.get("customerName"), Some(&json!("Bob")));
        assert!(!merged.contains_key("notes"));
    }

    #[test]
    fn booking_id_parses() {
        assert_eq!("17".parse::<BookingId>().unwrap(), BookingId::new(17));
        assert!("abc".parse::<BookingId>().is_err());
    }
}
