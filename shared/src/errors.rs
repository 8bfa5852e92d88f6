//! Error types for the Storefront services

use thiserror::Error;

/// Authentication and authorization failures
///
/// The `Display` text of each variant is the reason string sent to clients,
/// so it must never carry internal details.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("bad credentials")]
    InvalidCredentials,

    #[error("malformed token")]
    TokenMalformed,

    #[error("invalid token signature")]
    TokenInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("authentication required")]
    Unauthenticated,

    #[error("access denied")]
    Forbidden,
}
