//! Storefront product catalog service
//!
//! Public, read-only product listing for the shop frontend.

use anyhow::Result;
use storefront_backend::{routes, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = server::load_config()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Storefront catalog service"
    );

    let server_config = config.catalog.clone();
    let state = server::connect(config).await?;
    let app = routes::create_catalog_router(state);

    server::serve(app, &server_config).await
}
