//! Failure taxonomy shared by every component.
//!
//! A [`Failure`] always carries four fields: a [`FailureKind`], a short message,
//! an explanation that is safe to show to the caller, and a transport status hint.
//! Stores and gateways translate their low-level errors into a `Failure` at their
//! boundary; everything above them propagates the value unchanged.
//!
//! # Families
//!
//! | Family            | Kinds                                   | Status |
//! |-------------------|-----------------------------------------|--------|
//! | `ValidationError` | [`FailureKind::Validation`]             | 400    |
//! | `AppError`        | [`FailureKind::Repository`], [`FailureKind::NotFound`] | caller supplied |
//! | `ServiceError`    | [`FailureKind::Service`]                | caller supplied |
//! | `BrokerError`     | [`FailureKind::Broker`]                 | 503    |

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Message used for every schema-validation failure.
pub const VALIDATION_MESSAGE: &str = "Not able to validate the data sent in the request";

/// Message used for every broker connectivity failure.
pub const BROKER_MESSAGE: &str = "Cannot reach the message broker";

/// Machine-readable failure category.
///
/// The set is closed so transport adapters can match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Input failed schema validation.
    Validation,
    /// The datastore failed for a reason other than validation.
    Repository,
    /// The requested record does not exist.
    NotFound,
    /// A service-layer business rule rejected the request.
    Service,
    /// The message broker was unreachable or refused a publish.
    Broker,
}

impl FailureKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Repository => "RepositoryError",
            Self::NotFound => "NotFoundError",
            Self::Service => "ServiceError",
            Self::Broker => "BrokerError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed failure surfaced across a component boundary.
///
/// # Examples
///
/// ```
/// use booking_core::error::{Failure, FailureKind};
/// use http::StatusCode;
///
/// let failure = Failure::validation("customerName is required");
/// assert_eq!(failure.kind(), FailureKind::Validation);
/// assert_eq!(failure.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(failure.explanation(), "customerName is required");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{kind}] {message}")]
pub struct Failure {
    kind: FailureKind,
    message: String,
    explanation: String,
    status_code: StatusCode,
}

impl Failure {
    /// Create a failure from all four fields.
    ///
    /// Blank text is replaced so no field is ever empty: a blank message falls back
    /// to the kind label and a blank explanation falls back to the message.
    #[must_use]
    pub fn new(
        kind: FailureKind,
        message: impl Into<String>,
        explanation: impl Into<String>,
        status_code: StatusCode,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = kind.name().to_string();
        }
        let mut explanation = explanation.into();
        if explanation.trim().is_empty() {
            explanation.clone_from(&message);
        }
        Self {
            kind,
            message,
            explanation,
            status_code,
        }
    }

    /// A schema-validation failure (400) with the validation detail as explanation.
    #[must_use]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Validation,
            VALIDATION_MESSAGE,
            detail,
            StatusCode::BAD_REQUEST,
        )
    }

    /// A general application error with an explicit kind and status.
    #[must_use]
    pub fn app(
        kind: FailureKind,
        message: impl Into<String>,
        explanation: impl Into<String>,
        status_code: StatusCode,
    ) -> Self {
        Self::new(kind, message, explanation, status_code)
    }

    /// A service-layer business-rule failure.
    #[must_use]
    pub fn service(
        message: impl Into<String>,
        explanation: impl Into<String>,
        status_code: StatusCode,
    ) -> Self {
        Self::new(FailureKind::Service, message, explanation, status_code)
    }

    /// A broker connectivity failure (503).
    #[must_use]
    pub fn broker(explanation: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Broker,
            BROKER_MESSAGE,
            explanation,
            StatusCode::SERVICE_UNAVAILABLE,
        )
    }

    /// The failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Short, non-technical message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Detailed explanation, safe to show to the caller.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Transport status hint.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Whether the failure is the server's fault rather than the caller's.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code.is_server_error()
    }
}
