//! In-memory stores
//!
//! Behave like the PostgreSQL repositories (sequential ids, unique username
//! and email) without a database. Used by the test suites.

use super::{
    NewProduct, NewUser, ProductRepository, StoreError, StoreResult, UserChanges, UserRecord,
    UserRepository,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use storefront_shared::Product;
use tokio::sync::RwLock;

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// User store held in process memory
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a username or email already held by another user
    fn check_unique(
        table: &Table<UserRecord>,
        username: &str,
        email: &str,
        except: Option<i64>,
    ) -> StoreResult<()> {
        for user in table.rows.values().filter(|u| Some(u.id) != except) {
            if user.username == username {
                return Err(StoreError::Duplicate("username"));
            }
            if user.email == email {
                return Err(StoreError::Duplicate("email"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn save(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut table = self.table.write().await;
        Self::check_unique(&table, &user.username, &user.email, None)?;

        let record = UserRecord {
            id: table.allocate_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            roles: user.roles,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserRecord>> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        Self::check_unique(&table, &changes.username, &changes.email, Some(id))?;

        let Some(user) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.email = changes.email;
        user.roles = changes.roles;
        Ok(Some(user.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Product store held in process memory
#[derive(Default)]
pub struct InMemoryProductRepository {
    table: RwLock<Table<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, product: NewProduct) -> StoreResult<Product> {
        let mut table = self.table.write().await;
        let product = Product {
            id: table.allocate_id(),
            name: product.name,
            description: product.description,
            price: product.price,
        };
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_shared::RoleName;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            roles: vec![RoleName::User],
        }
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let first = repo.save(new_user("pepe", "pepe@correo.com")).await.unwrap();
        let second = repo.save(new_user("maria", "maria@correo.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.save(new_user("pepe", "pepe@correo.com")).await.unwrap();

        let dup_name = repo.save(new_user("pepe", "other@correo.com")).await;
        assert!(matches!(dup_name, Err(StoreError::Duplicate("username"))));

        let dup_email = repo.save(new_user("other", "pepe@correo.com")).await;
        assert!(matches!(dup_email, Err(StoreError::Duplicate("email"))));
    }

    #[tokio::test]
    async fn test_update_keeps_password_hash() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(new_user("pepe", "pepe@correo.com")).await.unwrap();

        let changes = UserChanges {
            username: "pepito".to_string(),
            email: "pepe@correo.com".to_string(),
            roles: vec![RoleName::User, RoleName::Admin],
        };
        let updated = repo.update(user.id, changes).await.unwrap().unwrap();

        assert_eq!(updated.username, "pepito");
        assert_eq!(updated.password_hash, "hash");
        assert!(updated.is_admin());
        assert!(repo.find_by_username("pepe").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let repo = InMemoryUserRepository::new();
        let changes = UserChanges {
            username: "ghost".to_string(),
            email: "ghost@correo.com".to_string(),
            roles: vec![],
        };
        assert!(repo.update(42, changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(new_user("pepe", "pepe@correo.com")).await.unwrap();

        assert!(repo.delete_by_id(user.id).await.unwrap());
        assert!(!repo.delete_by_id(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_product_store() {
        let repo = InMemoryProductRepository::new();
        let tv = repo
            .save(NewProduct {
                name: "Samsung Smart TV".to_string(),
                description: "Excelente televisor".to_string(),
                price: 1000,
            })
            .await
            .unwrap();

        assert_eq!(repo.find_by_id(tv.id).await.unwrap(), Some(tv.clone()));
        assert_eq!(repo.find_all().await.unwrap(), vec![tv.clone()]);
        assert!(repo.delete_by_id(tv.id).await.unwrap());
        assert!(repo.find_by_id(tv.id).await.unwrap().is_none());
    }
}
