//! Application entry point and server initialization
//!
//! Loads configuration, builds the in-memory store and the remote log client,
//! and serves the router until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use snaplink::config::AppConfig;
use snaplink::logger::{Level, LogClient, Package};
use snaplink::route::create_app;
use snaplink::service::{AppState, UrlService};
use snaplink::store::UrlStore;

/// # Environment Variables
///
/// - `PORT` - Server port number (default: 8080)
/// - `BASE_URL` - Prefix of generated short URLs (default: http://localhost:PORT)
/// - `MAX_URLS` - Store capacity (default: 5)
/// - `LOG_ENDPOINT`, `LOG_AUTH_TOKEN`, `LOG_CLIENT_ID`, `LOG_CLIENT_SECRET`,
///   `LOG_TIMEOUT_MS`, `LOG_STACK` - Remote log shipping
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snaplink=debug,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let logger = LogClient::new(&config.log).context("failed to build log client")?;
    if !logger.is_enabled() {
        tracing::warn!("LOG_ENDPOINT is empty, remote logging disabled");
    }

    let store = UrlStore::new(config.base_url.clone(), config.max_urls);
    let state = AppState::new(UrlService::new(store, logger.clone()));

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        port = config.port,
        base_url = %config.base_url,
        max_urls = config.max_urls,
        "server running"
    );
    logger.emit(
        Level::Info,
        Package::Handler,
        format!("URL shortener started on port {}", config.port),
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}
