//! Product catalog service

use crate::error::ApiError;
use crate::repositories::ProductRepository;
use storefront_shared::Product;

/// Read-only access to the catalog
pub struct ProductService;

impl ProductService {
    pub async fn list(products: &dyn ProductRepository) -> Result<Vec<Product>, ApiError> {
        Ok(products.find_all().await?)
    }

    pub async fn find(products: &dyn ProductRepository, id: i64) -> Result<Product, ApiError> {
        products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))
    }
}
