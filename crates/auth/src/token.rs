use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use talentbase_core::UserId;

use crate::claims::{validate_claims, AccessClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed token, wrong algorithm or bad signature.
    #[error("invalid token")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// HS256 codec for access tokens, keyed by the server-held secret.
///
/// The codec verifies the signature; the time window is checked separately via
/// [`validate_claims`] so verification stays deterministic under an injected
/// `now`.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed token for `user_id` with the fixed 7-day lifetime.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = AccessClaims::issue(user_id, now);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify signature and time window, returning the embedded claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
        // exp/iat are validated by `validate_claims` against the injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let codec = TokenCodec::new(b"test-secret");
        let user_id = UserId::new();
        let now = Utc::now();

        let token = codec.issue(user_id, now).unwrap();
        let claims = codec.verify(&token, now).unwrap();

        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn token_is_rejected_with_wrong_secret() {
        let codec = TokenCodec::new(b"test-secret");
        let other = TokenCodec::new(b"other-secret");
        let now = Utc::now();

        let token = codec.issue(UserId::new(), now).unwrap();
        assert!(matches!(other.verify(&token, now), Err(TokenError::Invalid)));
    }

    #[test]
    fn token_is_rejected_after_seven_days() {
        let codec = TokenCodec::new(b"test-secret");
        let now = Utc::now();

        let token = codec.issue(UserId::new(), now).unwrap();
        let later = now + Duration::days(7) + Duration::seconds(1);

        assert!(matches!(
            codec.verify(&token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = TokenCodec::new(b"test-secret");
        assert!(matches!(
            codec.verify("not-a-token", Utc::now()),
            Err(TokenError::Invalid)
        ));
    }
}
