//! Application state for Axum handlers.

use booking_core::workflow::BookingWorkflow;

/// Application state shared across all HTTP handlers.
///
/// Holds the fully wired [`BookingWorkflow`]; cloning is cheap because the
/// workflow only holds shared handles.
///
/// # Examples
///
/// ```ignore
/// use booking_core::{BookingService, BookingWorkflow};
/// use booking_web::AppState;
/// use std::sync::Arc;
///
/// let workflow = BookingWorkflow::new(BookingService::new(store), gateway, "REMINDER_SERVICE");
/// let app = booking_web::build_router(AppState::new(workflow));
/// ```
#[derive(Clone, Debug)]
pub struct AppState {
    /// The booking workflow behind every route.
    pub workflow: BookingWorkflow,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(workflow: BookingWorkflow) -> Self {
        Self { workflow }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Axum requires Clone state
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
