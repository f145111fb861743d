use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use super::BackendError;

fn argon2_failure(e: password_hash::Error) -> BackendError {
    BackendError::Unexpected(anyhow::anyhow!("argon2: {e}"))
}

/// PHC-format argon2id hash with a fresh salt.
pub fn hash_password(plain: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(argon2_failure)
}

/// `Ok(false)` for a wrong password; `Err` only when `stored` is not a PHC
/// string.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, BackendError> {
    let parsed = PasswordHash::new(stored).map_err(argon2_failure)?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(argon2_failure(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("tablefor2").expect("hashing should succeed");
        assert!(!hash.contains("tablefor2"));
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("tablefor2", &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("tablefor2").unwrap();
        let b = hash_password("tablefor2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("reservation-at-8").expect("hashing should succeed");
        assert!(!verify_password("reservation-at-9", &hash).expect("verify should not error"));
    }

    #[test]
    fn malformed_hash_is_an_unexpected_backend_error() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, BackendError::Unexpected(_)));
    }
}
