//! Token validation and authorization middleware
//!
//! `validation_filter` turns a bearer token into an [`AuthContext`] stored in
//! the request extensions; `authorization_filter` consults the policy table
//! against that context. Handlers that need the caller extract
//! `AuthContext` directly.

use super::{BEARER_PREFIX, LOGIN_ROUTE};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use storefront_shared::{AuthError, RoleName};
use tracing::{debug, warn};

/// Identity reconstructed from a validated token
///
/// Lives only for the request it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub authorities: Vec<RoleName>,
}

impl AuthContext {
    pub fn new(username: impl Into<String>, authorities: Vec<RoleName>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.authorities.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[RoleName]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::Admin)
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(ApiError::Auth(AuthError::Unauthenticated))
    }
}

/// Bearer token carried by the request, if any
///
/// A missing header or one using another scheme is not an error: the
/// request simply proceeds anonymously.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
}

fn is_login(request: &Request) -> bool {
    request.method() == Method::POST && request.uri().path() == LOGIN_ROUTE
}

/// Validate the bearer token, if present, and attach the caller's identity
///
/// An invalid token ends the request with 401; it is never downgraded to
/// an anonymous request.
pub async fn validation_filter(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_login(&request) {
        return Ok(next.run(request).await);
    }

    let Some(token) = bearer_token(request.headers()) else {
        return Ok(next.run(request).await);
    };

    let claims = state.tokens().decode(token).map_err(|e| {
        warn!(path = %request.uri().path(), reason = %e, "Rejected bearer token");
        ApiError::Auth(e)
    })?;

    debug!(username = %claims.sub, "Authenticated request");
    request
        .extensions_mut()
        .insert(AuthContext::new(claims.sub, claims.authorities));

    Ok(next.run(request).await)
}

/// Enforce the authorization policy for the request
pub async fn authorization_filter(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request.extensions().get::<AuthContext>();

    if let Err(e) = state
        .policy()
        .check(request.method(), request.uri().path(), identity)
    {
        debug!(
            method = %request.method(),
            path = %request.uri().path(),
            username = identity.map(|ctx| ctx.username.as_str()),
            reason = %e,
            "Request denied"
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
