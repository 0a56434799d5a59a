//! Asset Management Server
//!
//! REST API server for IT asset assignments and returns.

use anyhow::Context;
use axum::{
    routing::{get, put},
    Router,
};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asset_management_server::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "asset_management_server={},tower_http=debug",
            config.logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }

    tracing::info!("Starting Asset Management Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let mut connect_options =
        PgConnectOptions::from_str(&config.database.url).context("Invalid database URL")?;
    if config.database.statement_timeout_ms > 0 {
        connect_options = connect_options.options([(
            "statement_timeout",
            config.database.statement_timeout_ms.to_string(),
        )]);
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool.clone());
    let services = Services::new(repository, &config);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        pool,
    };

    // Build router
    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

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
        // Assignments
        .route(
            "/assignments",
            get(api::assignments::list_assignments).post(api::assignments::create_assignment),
        )
        .route(
            "/assignments/:id",
            get(api::assignments::get_assignment)
                .put(api::assignments::update_assignment)
                .delete(api::assignments::delete_assignment),
        )
        .route(
            "/assignments/:id/state",
            put(api::assignments::change_assignment_state),
        )
        // Return requests
        .route(
            "/return-requests",
            get(api::return_requests::list_return_requests)
                .post(api::return_requests::create_return_request),
        )
        .route(
            "/return-requests/:id/state",
            put(api::return_requests::change_return_request_state),
        )
        // Users
        .route(
            "/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/users/:id",
            get(api::users::get_user).delete(api::users::delete_user),
        )
        .route(
            "/users/:id/assignments",
            get(api::assignments::get_user_assignments),
        )
        .route(
            "/users/:id/assignments/filter",
            get(api::assignments::filter_user_assignments),
        )
        // Assets
        .route(
            "/assets",
            get(api::assets::list_assets).post(api::assets::create_asset),
        )
        .route("/assets/:id", get(api::assets::get_asset))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
