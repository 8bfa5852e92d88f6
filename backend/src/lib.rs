//! Storefront Backend Library
//!
//! Shared code of the user-management and catalog services, exposed for
//! the two binaries and the integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
