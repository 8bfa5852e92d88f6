//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the HTTP handlers and the stores.

pub mod product;
pub mod user;

pub use product::ProductService;
pub use user::UserService;
