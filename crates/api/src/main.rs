use std::net::SocketAddr;
use std::sync::Arc;

use sketchmap_api::config::ServerConfig;
use sketchmap_api::router::build_app_router;
use sketchmap_api::state::AppState;
use sketchmap_core::upload::UploadLimits;
use sketchmap_db::{BlobRepo, Database, RequestRepo};
use sketchmap_pipeline::runtime::HttpRuntime;
use sketchmap_pipeline::{Admission, Dispatcher, Resolver, RuntimeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sketchmap_api=debug,sketchmap_pipeline=debug,sketchmap_db=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let limits = UploadLimits::from_env().expect("Invalid upload limits");
    tracing::info!(max_pixels = limits.max_pixels_per_image, "Loaded upload limits");

    let runtime_config = RuntimeConfig::from_env().expect("Invalid job runtime configuration");
    tracing::info!(
        broker_url = %runtime_config.broker_url,
        result_backend_url = %runtime_config.result_backend_url,
        "Loaded job runtime configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::from_url(&database_url).expect("Invalid DATABASE_URL");

    db.health_check().await.expect("Database health check failed");
    tracing::info!("Database health check passed");

    let registry = Arc::new(RequestRepo::new(db.clone()));
    let blobs = Arc::new(BlobRepo::new(db));

    // --- Job runtime ---
    let runtime = HttpRuntime::new(&runtime_config).expect("Failed to build job runtime client");
    let dispatcher = Dispatcher::new(Arc::new(runtime));

    // --- App state ---
    let state = AppState {
        registry: registry.clone(),
        admission: Arc::new(Admission::new(
            registry.clone(),
            blobs,
            dispatcher.clone(),
            limits,
        )),
        resolver: Resolver::new(registry, dispatcher),
    };

    // --- Router ---
    let app = build_app_router(state, &config).expect("Failed to build router");

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM (on Unix) to initiate graceful shutdown.
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
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
