//! Product catalog API routes

use crate::error::ApiError;
use crate::services::ProductService;
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use storefront_shared::Product;

/// Create product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(show_product))
}

/// GET /products - List the catalog
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(ProductService::list(state.products()).await?))
}

/// GET /products/:id - Show one product
async fn show_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    Ok(Json(ProductService::find(state.products(), id).await?))
}
