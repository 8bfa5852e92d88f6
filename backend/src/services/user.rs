//! User management service
//!
//! Validation, password hashing and role assignment in front of the
//! credential store. Password hashing runs on the blocking thread pool.

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{NewUser, UserChanges, UserRecord, UserRepository};
use storefront_shared::{CreateUserRequest, RoleName, UpdateUserRequest, UserDto};
use tracing::info;

/// User service for account administration
pub struct UserService;

impl UserService {
    /// List every account
    pub async fn list(users: &dyn UserRepository) -> Result<Vec<UserDto>, ApiError> {
        let records = users.find_all().await?;
        Ok(records.into_iter().map(to_dto).collect())
    }

    /// Fetch one account by id
    pub async fn find(users: &dyn UserRepository, id: i64) -> Result<UserDto, ApiError> {
        users
            .find_by_id(id)
            .await?
            .map(to_dto)
            .ok_or_else(|| not_found(id))
    }

    /// Create an account
    ///
    /// Every account gets `ROLE_USER`; `ROLE_ADMIN` is added when the
    /// request sets `admin`.
    pub async fn create(
        users: &dyn UserRepository,
        request: CreateUserRequest,
    ) -> Result<UserDto, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let password_hash = PasswordService::hash_async(request.password)
            .await
            .map_err(ApiError::Internal)?;

        let record = users
            .save(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                roles: roles_for(request.admin),
            })
            .await?;

        info!(
            id = record.id,
            username = %record.username,
            admin = record.is_admin(),
            "User created"
        );
        Ok(to_dto(record))
    }

    /// Replace username, email and roles of an account
    ///
    /// The password hash is kept.
    pub async fn update(
        users: &dyn UserRepository,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserDto, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let record = users
            .update(
                id,
                UserChanges {
                    username: request.username,
                    email: request.email,
                    roles: roles_for(request.admin),
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(id, username = %record.username, admin = record.is_admin(), "User updated");
        Ok(to_dto(record))
    }

    /// Delete an account
    pub async fn remove(users: &dyn UserRepository, id: i64) -> Result<(), ApiError> {
        if !users.delete_by_id(id).await? {
            return Err(not_found(id));
        }
        info!(id, "User deleted");
        Ok(())
    }
}

/// Role set for a new or updated account
pub fn roles_for(admin: bool) -> Vec<RoleName> {
    if admin {
        vec![RoleName::User, RoleName::Admin]
    } else {
        vec![RoleName::User]
    }
}

fn to_dto(record: UserRecord) -> UserDto {
    UserDto {
        admin: record.is_admin(),
        id: record.id,
        username: record.username,
        email: record.email,
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("User {} not found", id))
}
