//! Booking endpoints.
//!
//! Every endpoint answers with the booking envelope:
//!
//! ```json
//! { "message": "...", "success": true, "err": {}, "data": { "id": 1, "customerName": "Alice", ... } }
//! ```
//!
//! On failure the status code is the failure's own and the envelope carries the
//! failure message and explanation (see [`AppError`]).

use crate::error::AppError;
use crate::extractors::{BookingPath, BookingPayload, CorrelationId};
use crate::state::AppState;
use axum::{extract::State, Json};
use booking_core::workflow::{BookingReply, CREATED_MESSAGE, FETCHED_MESSAGE, UPDATED_MESSAGE};

/// Create a booking.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/bookings
/// ```
///
/// # Errors
///
/// - 400 when the body is not a JSON object or fails validation
/// - 500 when the booking cannot be stored
pub async fn create_booking(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    BookingPayload(data): BookingPayload,
) -> Result<Json<BookingReply>, AppError> {
    tracing::debug!(%correlation_id, fields = data.len(), "Create booking request");
    let booking = state.workflow.create_booking(data).await?;
    Ok(Json(BookingReply::success(CREATED_MESSAGE, booking)))
}

/// Fetch a booking.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/bookings/:id
/// ```
///
/// # Errors
///
/// - 400 when `id` is not an integer
/// - 404 when no booking has that id
pub async fn get_booking(
    State(state): State<AppState>,
    BookingPath(id): BookingPath,
) -> Result<Json<BookingReply>, AppError> {
    let booking = state.workflow.get_booking(id).await?;
    Ok(Json(BookingReply::success(FETCHED_MESSAGE, booking)))
}

/// Apply a partial update to a booking.
///
/// # Endpoint
///
/// ```text
/// PATCH /api/v1/bookings/:id
/// ```
///
/// # Errors
///
/// - 400 when the body or the merged booking is invalid
/// - 404 when no booking has that id
/// - 500 when the booking cannot be stored
pub async fn update_booking(
    State(state): State<AppState>,
    BookingPath(id): BookingPath,
    BookingPayload(data): BookingPayload,
) -> Result<Json<BookingReply>, AppError> {
    let booking = state.workflow.update_booking(id, data).await?;
    Ok(Json(BookingReply::success(UPDATED_MESSAGE, booking)))
}
