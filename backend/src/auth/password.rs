//! Password hashing using argon2
//!
//! New hashes are Argon2id. Verification also accepts bcrypt hashes
//! (`$2a$`, `$2b$`, `$2y$`) imported from the legacy users table.
//!
//! Both algorithms are intentionally CPU-intensive; async callers go
//! through the `*_async` variants, which run on the blocking pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Well-formed Argon2id hash that no password matches
///
/// Uses the same parameters as [`PasswordService::hash`], so verifying
/// against it costs as much as verifying a real account.
pub const DUMMY_ARGON2_HASH: &str = concat!(
    "$argon2id$v=19$m=19456,t=2,p=1$IF0GI5BWKxg9QeG7sWC8lg",
    "$gdpOQH3vKk5Ab0CfocdtcamHRUUTO6dMM5OEfZe0F+A",
);

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch and `Err` only when the stored hash
    /// itself cannot be parsed.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if Self::is_bcrypt(hash) {
            return bcrypt::verify(password, hash)
                .map_err(|e| anyhow::anyhow!("Invalid bcrypt hash: {}", e));
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    fn is_bcrypt(hash: &str) -> bool {
        BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
    }
}
