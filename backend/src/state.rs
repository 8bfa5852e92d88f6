//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything here is built once at startup and read-only afterwards;
//! all fields are `Arc`s or wrap them, so cloning per request is cheap.

use crate::auth::{AuthorizationPolicy, TokenCodec};
use crate::config::AppConfig;
use crate::repositories::{PgProductRepository, PgUserRepository, ProductRepository, UserRepository};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub config: Arc<AppConfig>,
    /// Token codec holding the process-wide signing key
    pub tokens: TokenCodec,
    pub policy: Arc<AuthorizationPolicy>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Uses `jwt.secret` when configured; otherwise generates a random
    /// signing key that lives as long as this state.
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        config: AppConfig,
    ) -> Self {
        let secret = match &config.jwt.secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                info!("No JWT secret configured, generating an ephemeral signing key");
                TokenCodec::generate_secret()
            }
        };
        let tokens = TokenCodec::new(&secret, config.jwt.token_ttl_secs);

        Self {
            users,
            products,
            config: Arc::new(config),
            tokens,
            policy: Arc::new(AuthorizationPolicy::users_service()),
        }
    }

    /// Create state backed by PostgreSQL repositories sharing one pool
    pub fn with_pool(pool: PgPool, config: AppConfig) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgProductRepository::new(pool)),
            config,
        )
    }

    #[inline]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    #[inline]
    pub fn products(&self) -> &dyn ProductRepository {
        self.products.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    #[inline]
    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }
}
