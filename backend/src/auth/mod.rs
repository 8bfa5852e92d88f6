//! Authentication module
//!
//! Stateless JWT authentication with role-based authorization. Requests
//! pass through three middleware functions, outermost first:
//!
//! 1. [`authentication_filter`] answers `POST /login` with a signed token
//! 2. [`validation_filter`] turns a bearer token into an [`AuthContext`]
//! 3. [`authorization_filter`] checks the context against the policy table

mod jwt;
mod login;
mod middleware;
mod password;
mod policy;

pub use jwt::{Claims, TokenCodec, GENERATED_SECRET_LEN};
pub use login::authentication_filter;
pub use middleware::{authorization_filter, bearer_token, validation_filter, AuthContext};
pub use password::{PasswordService, DUMMY_ARGON2_HASH};
pub use policy::{Access, AuthorizationPolicy, PathPattern, Rule};

/// Route answered by the authentication filter
pub const LOGIN_ROUTE: &str = "/login";

/// Scheme prefix of the `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";
