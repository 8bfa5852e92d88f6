//! Storefront Shared Library
//!
//! This crate contains shared types, models, and utilities used by the
//! catalog and user-management services and their clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::*;
pub use types::*;
