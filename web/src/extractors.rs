//! Custom Axum extractors.
//!
//! - [`BookingPayload`]: a JSON object request body as `BookingData`
//! - [`BookingPath`]: the `:id` path segment as a `BookingId`
//! - [`CorrelationId`]: the request correlation ID set by the middleware
//!
//! Rejections are [`AppError`]s, so malformed requests render the same failure
//! envelope as workflow failures.

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use booking_core::booking::{BookingData, BookingId};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Booking fields taken from a JSON object body.
///
/// Anything other than a JSON object (invalid JSON, an array, a missing
/// `Content-Type: application/json`) is rejected with a 400 `ValidationError`.
#[derive(Debug, Clone)]
pub struct BookingPayload(pub BookingData);

#[async_trait]
impl<S> FromRequest<S> for BookingPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        match value {
            Value::Object(data) => Ok(Self(data)),
            _ => Err(AppError::bad_request("Request body must be a JSON object")),
        }
    }
}

/// Booking identifier taken from the request path.
#[derive(Debug, Clone, Copy)]
pub struct BookingPath(pub BookingId);

#[async_trait]
impl<S> FromRequestParts<S> for BookingPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        raw.parse::<BookingId>()
            .map(Self)
            .map_err(|_| AppError::bad_request(format!("'{raw}' is not a valid booking id")))
    }
}

/// Correlation ID for request tracing.
///
/// Read from the request extensions populated by
/// [`correlation_id_layer`](crate::middleware::correlation_id_layer); falls back to
/// the `X-Correlation-ID` header, then to a fresh UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}
