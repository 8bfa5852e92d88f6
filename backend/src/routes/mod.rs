//! Route definitions for the Storefront services
//!
//! Each service gets its own router; both share the outer middleware stack
//! (tracing, request ids, CORS, timeout, compression). Only the users
//! service runs the authentication pipeline.

use crate::auth::{authentication_filter, authorization_filter, validation_filter};
use crate::config::CorsConfig;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method, Uri},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

mod health;
mod products;
mod users;

#[cfg(test)]
mod auth_tests;

pub use products::product_routes;
pub use users::user_routes;

/// Whole-request deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Router of the user-management service
///
/// Requests pass the authentication filter, then token validation, then
/// the authorization policy before reaching a handler. `POST /login` has no
/// route of its own: the authentication filter answers it.
pub fn create_users_router(state: AppState) -> Router {
    let router = health_routes()
        .merge(user_routes())
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), authorization_filter))
        .layer(middleware::from_fn_with_state(state.clone(), validation_filter))
        .layer(middleware::from_fn_with_state(state.clone(), authentication_filter));

    with_common_layers(router, &state.config().cors).with_state(state)
}

/// Router of the product catalog service
pub fn create_catalog_router(state: AppState) -> Router {
    let router = health_routes().merge(product_routes()).fallback(fallback);

    with_common_layers(router, &state.config().cors).with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
}

fn with_common_layers(router: Router<AppState>, cors: &CorsConfig) -> Router<AppState> {
    router
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer(cors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the browser frontend
///
/// Credentials are allowed, so origins must be listed explicitly.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
