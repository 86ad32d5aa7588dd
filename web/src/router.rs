//! Route table for the booking API.

use crate::handlers;
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// | Method  | Path                   | Handler                                |
/// |---------|------------------------|----------------------------------------|
/// | `POST`  | `/api/v1/bookings`     | [`handlers::create_booking`]           |
/// | `GET`   | `/api/v1/bookings/:id` | [`handlers::get_booking`]              |
/// | `PATCH` | `/api/v1/bookings/:id` | [`handlers::update_booking`]           |
/// | `POST`  | `/api/v1/publish`      | [`handlers::publish_reminder`]         |
/// | `GET`   | `/health`              | [`handlers::health_check`]             |
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/bookings", post(handlers::create_booking))
        .route(
            "/bookings/:id",
            get(handlers::get_booking).patch(handlers::update_booking),
        )
        .route("/publish", post(handlers::publish_reminder));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(handlers::health_check))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
