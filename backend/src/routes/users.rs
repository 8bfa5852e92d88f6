//! User management API routes
//!
//! Access rules live in the authorization policy; handlers that need the
//! caller's identity only use it for audit logging.

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use storefront_shared::{CreateUserRequest, UpdateUserRequest, UserDto};
use tracing::info;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(show_user).put(update_user).delete(remove_user),
        )
}

/// GET /users - List all users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = UserService::list(state.users()).await?;
    Ok(Json(users))
}

/// GET /users/:id - Show one user
async fn show_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let Path(id) = id?;
    let user = UserService::find(state.users(), id).await?;
    Ok(Json(user))
}

/// POST /users - Create a user
async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Json(req) = payload?;
    info!(by = %auth.username, username = %req.username, "Creating user");
    let user = UserService::create(state.users(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/:id - Update a user
///
/// Answers 201 like the create endpoint.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    info!(by = %auth.username, id, "Updating user");
    let user = UserService::update(state.users(), id, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /users/:id - Delete a user
async fn remove_user(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    info!(by = %auth.username, id, "Deleting user");
    UserService::remove(state.users(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
