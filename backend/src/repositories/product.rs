//! PostgreSQL product repository

use super::{NewProduct, ProductRepository, StoreResult};
use crate::db;
use async_trait::async_trait;
use sqlx::PgPool;
use storefront_shared::Product;

/// Product record from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRecord {
    id: i64,
    name: String,
    description: Option<String>,
    price: i64,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            id: record.id,
            name: record.name,
            description: record.description.unwrap_or_default(),
            price: record.price,
        }
    }
}

/// Product repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        let records = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, description, price
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Product>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, description, price
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Product::from))
    }

    async fn save(&self, product: NewProduct) -> StoreResult<Product> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            INSERT INTO products (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, price
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(db::health_check(&self.pool).await?)
    }
}
