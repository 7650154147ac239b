use std::net::SocketAddr;
use std::sync::Arc;

use portal_storage::local::LocalObjectStore;
use portal_storage::s3::S3ObjectStore;
use portal_storage::ObjectStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_api::config::{ServerConfig, StorageConfig};
use portal_api::mailer::Mailer;
use portal_api::router::build_app_router;
use portal_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = portal_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    portal_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    portal_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let mut local_store: Option<Arc<LocalObjectStore>> = None;
    let object_store: Arc<dyn ObjectStore> = match &config.storage {
        StorageConfig::Local {
            root,
            signing_secret,
        } => {
            let store = Arc::new(LocalObjectStore::new(
                root.clone(),
                config.public_base_url.clone(),
                signing_secret.clone(),
            ));
            tracing::info!(root = %root, "Local object store ready");
            local_store = Some(Arc::clone(&store));
            store
        }
        StorageConfig::S3 { bucket } => {
            let aws_config = aws_config::load_from_env().await;
            let client = aws_sdk_s3::Client::new(&aws_config);
            tracing::info!(bucket = %bucket, "S3 object store ready");
            Arc::new(S3ObjectStore::new(client, bucket.clone()))
        }
    };

    // --- Mailer ---
    let mailer = Arc::new(Mailer::new(config.smtp.as_ref()));
    if config.smtp.is_some() {
        tracing::info!("SMTP mailer configured");
    } else {
        tracing::info!("SMTP not configured; invites will be logged");
    }

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        object_store,
        local_store,
        mailer,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

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

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
