//! HTTP surface of the booking service.
//!
//! Axum handlers translate requests into [`BookingWorkflow`] calls and map the
//! outcome onto the booking envelope:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Axum (this crate)          │  ← JSON parsing, status codes
//! │  - Extractors (payload, path, ids)      │  ← Correlation IDs, logging
//! │  - Handlers                             │
//! ├─────────────────────────────────────────┤
//! │           BookingWorkflow (core)        │
//! │  - Validation and persistence           │  ← BookingStore
//! │  - Reminder broadcast                   │  ← QueueGateway
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use booking_web::{build_router, AppState};
//!
//! let app = build_router(AppState::new(workflow));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! [`BookingWorkflow`]: booking_core::BookingWorkflow

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{BookingPath, BookingPayload, CorrelationId};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
