//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Email syntax checks come from the `validator` crate.

use crate::types::{CreateUserRequest, FieldErrors, UpdateUserRequest};
use validator::ValidateEmail;

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 8;

/// Validate username: required, 4 to 8 characters
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("must not be blank".to_string());
    }
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(format!(
            "size must be between {} and {}",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        ));
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    if !email.validate_email() {
        return Err("must be a well-formed email address".to_string());
    }
    Ok(())
}

/// Validate password presence
///
/// Strength rules are not enforced; accounts are provisioned by admins.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.trim().is_empty() {
        return Err("must not be blank".to_string());
    }
    Ok(())
}

fn collect(errors: &mut FieldErrors, field: &str, result: Result<(), String>) {
    if let Err(msg) = result {
        errors.insert(field.to_string(), format!("The field {} {}", field, msg));
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl CreateUserRequest {
    /// Validate every field, reporting all failures at once
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        collect(&mut errors, "username", validate_username(&self.username));
        collect(&mut errors, "password", validate_password(&self.password));
        collect(&mut errors, "email", validate_email(&self.email));
        finish(errors)
    }
}

impl UpdateUserRequest {
    /// Validate every field, reporting all failures at once
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        collect(&mut errors, "username", validate_username(&self.username));
        collect(&mut errors, "email", validate_email(&self.email));
        finish(errors)
    }
}
