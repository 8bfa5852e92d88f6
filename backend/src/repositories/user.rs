//! PostgreSQL user repository

use super::{NewUser, StoreError, StoreResult, UserChanges, UserRecord, UserRepository};
use crate::db;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use storefront_shared::RoleName;
use tracing::warn;

/// User row joined with its role names
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    roles: Vec<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        let roles = row
            .roles
            .iter()
            .filter_map(|name| match name.parse::<RoleName>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!(user_id = row.id, "Ignoring stored role: {}", e);
                    None
                }
            })
            .collect();

        UserRecord {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password,
            roles,
        }
    }
}

const SELECT_USERS: &str = r#"
    SELECT u.id, u.username, u.email, u.password,
           COALESCE(
               array_agg(r.name::text ORDER BY r.id) FILTER (WHERE r.name IS NOT NULL),
               '{}'::text[]
           ) AS roles
    FROM users u
    LEFT JOIN users_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

/// User repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(
        &self,
        clause: &str,
        bind: QueryArg<'_>,
    ) -> StoreResult<Option<UserRecord>> {
        let sql = format!("{} WHERE {} GROUP BY u.id", SELECT_USERS, clause);
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match bind {
            QueryArg::Id(id) => query.bind(id),
            QueryArg::Username(name) => query.bind(name),
        };

        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(UserRecord::from))
    }

    async fn replace_roles(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        roles: &[RoleName],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM users_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        let names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO users_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(&names)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

enum QueryArg<'a> {
    Id(i64),
    Username(&'a str),
}

/// Translate unique violations into `StoreError::Duplicate`
fn map_unique(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => "email",
                _ => "username",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> StoreResult<Vec<UserRecord>> {
        let sql = format!("{} GROUP BY u.id ORDER BY u.id", SELECT_USERS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        self.find_where("u.id = $1", QueryArg::Id(id)).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        self.find_where("u.username = $1", QueryArg::Username(username))
            .await
    }

    async fn save(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;

        Self::replace_roles(&mut tx, id, &user.roles).await?;
        tx.commit().await?;

        Ok(UserRecord {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            roles: user.roles,
        })
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserRecord>> {
        let mut tx = self.pool.begin().await?;

        let password_hash = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE users SET username = $2, email = $3
            WHERE id = $1
            RETURNING password
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_unique)?;

        let Some(password_hash) = password_hash else {
            return Ok(None);
        };

        Self::replace_roles(&mut tx, id, &changes.roles).await?;
        tx.commit().await?;

        Ok(Some(UserRecord {
            id,
            username: changes.username,
            email: changes.email,
            password_hash,
            roles: changes.roles,
        }))
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        // users_roles rows go with the user (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(db::health_check(&self.pool).await?)
    }
}
