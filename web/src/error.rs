//! Error types for web handlers.
//!
//! [`AppError`] bridges the core [`Failure`] taxonomy and HTTP responses. It
//! implements Axum's `IntoResponse` so handlers can return `Result<_, AppError>`
//! and use `?` on workflow results.
//!
//! Every error renders as the booking failure envelope:
//!
//! ```json
//! { "message": "<failure message>", "success": false, "err": "<explanation>", "data": {} }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use booking_core::error::{Failure, FailureKind};
use booking_core::workflow::BookingReply;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<BookingReply>, AppError> {
///     let booking = state.workflow.get_booking(id).await?;
///     Ok(Json(BookingReply::success(FETCHED_MESSAGE, booking)))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AppError {
    failure: Failure,
}

impl AppError {
    /// The wrapped failure.
    #[must_use]
    pub const fn failure(&self) -> &Failure {
        &self.failure
    }

    /// The HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.failure.status_code()
    }

    /// A 400 error for a request that could not be understood.
    #[must_use]
    pub fn bad_request(explanation: impl Into<String>) -> Self {
        Failure::validation(explanation).into()
    }
}

impl From<Failure> for AppError {
    fn from(failure: Failure) -> Self {
        Self { failure }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.failure, f)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self.failure.kind() {
            FailureKind::Repository | FailureKind::Service | FailureKind::Broker => {
                tracing::error!(
                    status = %status,
                    kind = %self.failure.kind(),
                    message = %self.failure.message(),
                    "Request failed"
                );
            },
            FailureKind::Validation | FailureKind::NotFound => {
                tracing::debug!(
                    status = %status,
                    kind = %self.failure.kind(),
                    explanation = %self.failure.explanation(),
                    "Request rejected"
                );
            },
        }

        (status, Json(BookingReply::failure(&self.failure))).into_response()
    }
}
