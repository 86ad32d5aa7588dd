//! Reminder broadcast endpoint.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use booking_core::workflow::BroadcastReply;

/// Publish one reminder notification.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/publish
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Successfully published the data" }
/// ```
///
/// # Errors
///
/// - 503 when the broker cannot be reached
pub async fn publish_reminder(State(state): State<AppState>) -> Result<Json<BroadcastReply>, AppError> {
    state.workflow.trigger_reminder_broadcast().await?;
    Ok(Json(BroadcastReply::published()))
}
