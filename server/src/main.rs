//! Booking service HTTP server.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Installs the Prometheus exporter
//! - Connects the `PostgreSQL` booking store and runs its migration
//! - Prepares the `RedPanda` reminder gateway (connected on first publish)
//! - Serves the booking API until Ctrl+C or SIGTERM
//!
//! # Usage
//!
//! ```bash
//! docker compose up -d
//! cargo run --bin booking-server
//! ```

mod config;

use booking_core::{service::BookingService, workflow::BookingWorkflow};
use booking_postgres::PostgresBookingStore;
use booking_redpanda::RedpandaQueueGateway;
use booking_web::{build_router, AppState};
use config::Config;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booking=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        redpanda = %config.redpanda.brokers,
        routing_key = %config.redpanda.reminder_routing_key,
        "Configuration loaded"
    );

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.server.metrics_port))
        .install()?;
    register_metrics();
    info!(port = config.server.metrics_port, "Prometheus metrics exporter installed");

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await?;
    let store = PostgresBookingStore::from_pool(pool);
    store.migrate().await?;
    info!("Booking store ready");

    let gateway = RedpandaQueueGateway::builder()
        .brokers(config.redpanda.brokers.clone())
        .timeout(config.redpanda_timeout())
        .build()?;

    let workflow = BookingWorkflow::new(
        BookingService::new(Arc::new(store)),
        Arc::new(gateway),
        config.redpanda.reminder_routing_key.clone(),
    );
    let app = build_router(AppState::new(workflow));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let shutdown = async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    };
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        Ok(()) = signalled_rx => {
            match tokio::time::timeout(config.shutdown_timeout(), &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    timeout_secs = config.server.shutdown_timeout,
                    "In-flight requests did not finish before the shutdown timeout"
                ),
            }
        }
    }

    info!("Server stopped");
    Ok(())
}

fn register_metrics() {
    metrics::describe_counter!("bookings_created_total", "Bookings persisted");
    metrics::describe_counter!(
        "bookings_failed_total",
        "Booking operations that failed, by failure kind"
    );
    metrics::describe_counter!("reminders_published_total", "Reminder broadcasts handed to the broker");
    metrics::describe_counter!(
        "reminders_failed_total",
        "Reminder broadcasts that failed, by failure kind"
    );
    metrics::describe_counter!("broker_channel_setups_total", "Broker channels established");
    metrics::describe_counter!("http_requests_total", "HTTP requests by method and status");
}

/// Waits for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM signal, shutting down gracefully..."),
    }
}
