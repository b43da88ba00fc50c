use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a plaintext password with bcrypt at the default cost.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a failed verification, not an error:
/// login must not distinguish the two.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        // Minimum cost (bcrypt's MIN_COST == 4) keeps the test fast; verification is cost-agnostic.
        let hash = bcrypt::hash("hunter2", 4).unwrap();

        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
