//! Spindle Server - CNC Training Scheduling
//!
//! REST API server coordinating training requests against a shared team
//! calendar, with a background poller detecting external confirmations.

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spindle_server::{
    api,
    config::AppConfig,
    repository::{Repository, RequestStore},
    services::{
        calendar::{CalendarStore, HttpCalendarStore, InMemoryCalendarStore},
        email::{EmailNotifier, Notifier},
        poller::ConfirmationPoller,
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("spindle_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Spindle Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Wire the persistence, calendar and notification seams
    let repository = Repository::new(pool);
    let store: Arc<dyn RequestStore> = Arc::new(repository.requests.clone());

    let calendar: Arc<dyn CalendarStore> = match config.calendar.backend.as_str() {
        "memory" => {
            tracing::warn!("Using in-memory calendar backend (development only)");
            Arc::new(InMemoryCalendarStore::new())
        }
        _ => Arc::new(
            HttpCalendarStore::new(&config.calendar).expect("Failed to build calendar client"),
        ),
    };
    tracing::info!(backend = %config.calendar.backend, "Calendar store ready");

    let notifier: Arc<dyn Notifier> = Arc::new(EmailNotifier::new(config.email.clone()));

    let services = Services::new(store.clone(), calendar.clone(), notifier, &config);

    // Start the confirmation poller
    let poller = ConfirmationPoller::new(
        store,
        calendar,
        services.scheduling.clone(),
        &config.poller,
    );
    let poller_cancel = CancellationToken::new();
    let poller_handle = tokio::spawn({
        let cancel = poller_cancel.clone();
        async move { poller.run(cancel).await }
    });

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let a sweep in flight finish before exiting
    poller_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(10), poller_handle).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Intake
        .route("/requests", post(api::requests::create_request))
        .route("/requests", get(api::requests::list_requests))
        .route("/requests/:reference", get(api::requests::get_request))
        // Scheduling
        .route(
            "/requests/:reference/availability",
            get(api::scheduling::check_availability),
        )
        .route(
            "/requests/:reference/suggestions",
            get(api::scheduling::suggest_alternatives),
        )
        .route("/requests/:reference/dates", post(api::scheduling::select_dates))
        .route("/requests/:reference/reject", post(api::scheduling::reject_request))
        .route(
            "/requests/:reference/complete",
            post(api::scheduling::complete_request),
        )
        .route("/availability", get(api::scheduling::check_technician_availability))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
