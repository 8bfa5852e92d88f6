//! Process bootstrap shared by both service binaries
//!
//! Logging setup, configuration checks, store wiring and the serve loop
//! with graceful shutdown.

use crate::config::{AppConfig, ServerConfig};
use crate::{db, state::AppState};
use anyhow::Result;
use axum::Router;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "storefront_backend=info,tower_http=info".into()
        } else {
            "storefront_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Load `.env` and configuration, refusing unsafe production settings
pub fn load_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load()?;

    if AppConfig::is_production() {
        validate_production_config(&config)?;
    }
    Ok(config)
}

fn validate_production_config(config: &AppConfig) -> Result<()> {
    let errors = config.production_errors();

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Connect to PostgreSQL and build the shared state
///
/// Migrations run here outside production; production deployments apply
/// them with a separate job.
pub async fn connect(config: AppConfig) -> Result<AppState> {
    info!("Connecting to database...");
    let pool = db::create_pool(&config.database).await?;

    if !AppConfig::is_production() {
        db::run_migrations(&pool).await?;
    }

    Ok(AppState::with_pool(pool, config))
}

/// Bind `server` and serve `app` until Ctrl+C or SIGTERM
pub async fn serve(app: Router, server: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
