//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod bookings;
pub mod health;
pub mod reminders;

// Re-export common handler utilities
pub use bookings::{create_booking, get_booking, update_booking};
pub use health::health_check;
pub use reminders::publish_reminder;
