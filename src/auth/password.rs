// Password hashing and signup validation

use crate::auth::error::{AuthError, AuthResult};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Default bcrypt cost factor. Tunable per deployment via config; higher
/// values are slower and more brute-force resistant.
pub const BCRYPT_COST: u32 = DEFAULT_COST;

/// Maximum password length (bcrypt only hashes the first 72 bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Maximum username length accepted at signup.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Structurally valid bcrypt hash that matches no real password. Verified
/// against when a login names an unknown username, so both failure paths
/// cost one bcrypt round.
const DUMMY_HASH: &str = "$2b$12$fLqBk0zGeyO7d2XArM9tNuw1VhSxTj3JpEoC5DnI8Ka6RbYsHmGcW";

/// Hash a password with bcrypt.
///
/// A fresh random salt is generated per call and embedded, together with the
/// algorithm id and cost, in the returned encoded string. Runs on the
/// blocking thread pool since bcrypt is CPU-bound.
pub async fn hash_password(password: &str, cost: u32) -> AuthResult<String> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("Task join error: {e}")))?
}

/// Verify a password against a stored bcrypt hash.
///
/// Digest comparison is constant-time (provided by the bcrypt crate). A
/// malformed stored hash counts as a mismatch rather than an error, so this
/// never fails on bad input.
pub async fn verify_password(password: &str, stored_hash: &str) -> AuthResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    tokio::task::spawn_blocking(move || match verify(password, &stored_hash) {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::debug!("stored hash failed to parse, treating as mismatch: {e}");
            Ok(false)
        }
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("Task join error: {e}")))?
}

/// Burn one bcrypt verification against a hash that matches nothing.
///
/// Called on the unknown-username login path so its timing is
/// indistinguishable from a wrong-password attempt.
pub async fn dummy_verify(password: &str) {
    let _ = verify_password(password, DUMMY_HASH).await;
}

/// Validate signup input before any hashing or storage work.
pub fn validate_signup(username: &str, password: &str) -> AuthResult<()> {
    if username.trim().is_empty() {
        return Err(AuthError::Validation("Username cannot be empty".into()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Username too long (max {MAX_USERNAME_LENGTH} characters)"
        )));
    }
    if password.is_empty() {
        return Err(AuthError::Validation("Password cannot be empty".into()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 keeps bcrypt fast in tests; production uses BCRYPT_COST.
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_and_verify_roundtrip() {
        let hashed = hash_password("correct horse battery", TEST_COST)
            .await
            .expect("hash");
        assert!(hashed.starts_with("$2"));

        assert!(verify_password("correct horse battery", &hashed)
            .await
            .expect("verify"));
        assert!(!verify_password("wrong horse battery", &hashed)
            .await
            .expect("verify"));
    }

    #[tokio::test]
    async fn same_password_hashes_differently() {
        let a = hash_password("samepassword1", TEST_COST).await.unwrap();
        let b = hash_password("samepassword1", TEST_COST).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_a_mismatch_not_an_error() {
        let result = verify_password("whatever123", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Ok(false)));

        let result = verify_password("whatever123", "").await;
        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test]
    async fn dummy_hash_matches_nothing() {
        assert!(!verify_password("password123", DUMMY_HASH).await.unwrap());
        assert!(!verify_password("", DUMMY_HASH).await.unwrap());
    }

    #[test]
    fn validate_rejects_empty_username() {
        assert!(matches!(
            validate_signup("", "longenough1"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            validate_signup("   ", "longenough1"),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_password() {
        let result = validate_signup("alice", "");
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[test]
    fn validate_rejects_overlong_inputs() {
        let long_name = "u".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(validate_signup(&long_name, "longenough1").is_err());

        let long_password = "p".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(validate_signup("alice", &long_password).is_err());
    }

    #[test]
    fn validate_accepts_reasonable_input() {
        assert!(validate_signup("alice", "secret-enough").is_ok());
    }
}
