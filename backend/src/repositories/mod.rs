//! Data store interfaces
//!
//! Services depend on the traits here; `AppState` holds them as trait
//! objects so the same handlers run against PostgreSQL or the in-memory
//! stores used by tests and demos.

pub mod memory;
pub mod product;
pub mod user;

use async_trait::async_trait;
use storefront_shared::{Product, RoleName};
use thiserror::Error;

pub use memory::{InMemoryProductRepository, InMemoryUserRepository};
pub use product::PgProductRepository;
pub use user::PgUserRepository;

/// Errors raised by a store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique column (named here) already holds the value
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<RoleName>,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&RoleName::Admin)
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<RoleName>,
}

/// Input for updating a user; the password hash is left untouched
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub roles: Vec<RoleName>,
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
}

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<UserRecord>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    async fn save(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Returns `None` when no user has the given id
    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserRecord>>;

    /// Returns whether a user was deleted
    async fn delete_by_id(&self, id: i64) -> StoreResult<bool>;

    /// Cheap reachability check for readiness probes
    async fn ping(&self) -> StoreResult<()>;
}

/// Product store
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Product>>;

    async fn save(&self, product: NewProduct) -> StoreResult<Product>;

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}
