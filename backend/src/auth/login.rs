//! Login handling
//!
//! `authentication_filter` intercepts `POST /login`, checks the submitted
//! credentials against the user store and answers with a signed token.
//! Every other request passes straight through.
//!
//! Credential lookup and password verification share one deadline
//! (`auth.login_timeout_ms`); running out of time counts as bad credentials.

use super::{PasswordService, BEARER_PREFIX, DUMMY_ARGON2_HASH, LOGIN_ROUTE};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{UserRecord, UserRepository};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use storefront_shared::{AuthError, LoginRequest, LoginResponse};
use tracing::{error, info, warn};

/// Largest login body we are willing to buffer
const MAX_LOGIN_BODY_BYTES: usize = 16 * 1024;

/// A freshly issued token and the identity it was issued for
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub username: String,
}

/// Answer `POST /login`, pass everything else on
pub async fn authentication_filter(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() != Method::POST || request.uri().path() != LOGIN_ROUTE {
        return Ok(next.run(request).await);
    }

    let Some(credentials) = read_credentials(request.into_body()).await else {
        warn!("Login rejected: unreadable credentials");
        return Err(AuthError::InvalidCredentials.into());
    };

    let issued = authenticate(&state, credentials).await?;
    Ok(successful_authentication(issued))
}

/// Parse the login body; any failure is treated as bad credentials
async fn read_credentials(body: Body) -> Option<LoginRequest> {
    let bytes = axum::body::to_bytes(body, MAX_LOGIN_BODY_BYTES).await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Verify credentials and issue a token for the account
pub async fn authenticate(state: &AppState, credentials: LoginRequest) -> ApiResult<IssuedToken> {
    let timeout = state.config().auth.login_timeout();
    let username = credentials.username.clone();

    let user = match tokio::time::timeout(
        timeout,
        verify_credentials(state.users(), credentials),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            warn!(%username, timeout_ms = timeout.as_millis() as u64, "Login timed out");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state
        .tokens()
        .issue(&user.username, &user.roles)
        .map_err(ApiError::Internal)?;

    info!(username = %user.username, admin = user.is_admin(), "User signed in");
    Ok(IssuedToken {
        token,
        username: user.username,
    })
}

/// Look up the account and check the password against its stored hash
async fn verify_credentials(
    users: &dyn UserRepository,
    credentials: LoginRequest,
) -> Result<UserRecord, AuthError> {
    let LoginRequest { username, password } = credentials;

    let found = users.find_by_username(&username).await.map_err(|e| {
        error!(%username, "Credential lookup failed: {}", e);
        AuthError::InvalidCredentials
    })?;

    let Some(user) = found else {
        // Same hashing cost as a known account with a wrong password
        let _ = PasswordService::verify_async(password, DUMMY_ARGON2_HASH.to_string()).await;
        warn!(%username, "Login rejected: unknown user");
        return Err(AuthError::InvalidCredentials);
    };

    let valid = PasswordService::verify_async(password, user.password_hash.clone())
        .await
        .map_err(|e| {
            error!(%username, "Password verification failed: {}", e);
            AuthError::InvalidCredentials
        })?;

    if !valid {
        warn!(%username, "Login rejected: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}

fn successful_authentication(issued: IssuedToken) -> Response {
    let header = format!("{}{}", BEARER_PREFIX, issued.token);
    let body = LoginResponse {
        message: format!(
            "Hello {}, you have signed in successfully!",
            issued.username
        ),
        token: issued.token,
        username: issued.username,
    };

    (StatusCode::OK, [(AUTHORIZATION, header)], Json(body)).into_response()
}
