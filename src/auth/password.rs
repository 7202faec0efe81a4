// Credential hashing and verification. bcrypt embeds a per-hash salt and cost
// parameter; verification recomputes the hash, so timing does not depend on
// how much of the stored hash matches.
use crate::error::{AppError, ErrorKind};

/// Hash a secret for storage
pub fn hash_password(secret: &str) -> Result<String, AppError> {
    bcrypt::hash(secret, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::wrap(ErrorKind::Internal, "failed to hash password", e))
}

/// Compare a presented secret against a stored hash
pub fn verify_password(secret: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(secret, hash)
        .map_err(|e| AppError::wrap(ErrorKind::Internal, "failed to verify password", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    // low cost keeps the tests fast; the embedded cost makes this explicit
    fn hash_fast(secret: &str) -> String {
        bcrypt::hash(secret, 4).expect("hash")
    }

    #[test]
    fn verify_accepts_matching_secret() {
        let hash = hash_fast("correct horse");
        assert!(verify_password("correct horse", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_other_secret() {
        let hash = hash_fast("correct horse");
        assert!(!verify_password("battery staple", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted_per_invocation() {
        assert_ne!(hash_fast("s"), hash_fast("s"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("s", "not-a-bcrypt-hash").is_err());
    }
}
