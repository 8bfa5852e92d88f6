//! Storefront user-management service
//!
//! User CRUD behind stateless JWT authentication.
//!
//! ## Architecture
//!
//! - Routes: HTTP handlers plus the auth middleware pipeline
//! - Services: validation, hashing and role assignment
//! - Repositories: PostgreSQL stores (in-memory variants for tests)

use anyhow::Result;
use storefront_backend::{config::AppConfig, routes, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = server::load_config()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        "Starting Storefront user service"
    );

    let server_config = config.server.clone();
    let state = server::connect(config).await?;
    let app = routes::create_users_router(state);

    server::serve(app, &server_config).await
}
