use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use talentbase_core::UserId;

/// Fixed access-token lifetime, counted from issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Access-token claims (transport-agnostic).
///
/// This is the full set of claims the platform puts into a bearer token.
/// Tenant context is *not* part of the token: memberships are resolved per
/// request from storage, so a role change takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the actor identifier.
    pub sub: UserId,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

impl AccessClaims {
    /// Stamp a fresh set of claims for `user_id` with the fixed 7-day lifetime.
    pub fn issue(user_id: UserId, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user_id,
            iat,
            exp: iat + TOKEN_TTL_DAYS * 86_400,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate token claims against `now`.
///
/// Signature verification is the codec's job (see [`crate::TokenCodec`]); this
/// checks the time window only, so it can be tested without clocks or keys.
pub fn validate_claims(claims: &AccessClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn issued_claims_are_valid_for_seven_days() {
        let issued = now();
        let claims = AccessClaims::issue(UserId::new(), issued);

        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 86_400);
        assert!(validate_claims(&claims, issued).is_ok());
        assert!(validate_claims(&claims, issued + Duration::days(6)).is_ok());
    }

    #[test]
    fn claims_expire_after_the_window() {
        let issued = now();
        let claims = AccessClaims::issue(UserId::new(), issued);

        let err = validate_claims(&claims, issued + Duration::days(8)).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let issued = now();
        let claims = AccessClaims::issue(UserId::new(), issued);
        let exactly_expired = DateTime::from_timestamp(claims.exp, 0).unwrap();

        let err = validate_claims(&claims, exactly_expired).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn future_iat_is_rejected() {
        let issued = now();
        let claims = AccessClaims::issue(UserId::new(), issued + Duration::hours(1));

        let err = validate_claims(&claims, issued).unwrap_err();
        assert_eq!(err, TokenValidationError::NotYetValid);
    }

    #[test]
    fn inverted_time_window_is_rejected() {
        let issued = now();
        let mut claims = AccessClaims::issue(UserId::new(), issued);
        claims.exp = claims.iat - 1;

        let err = validate_claims(&claims, issued).unwrap_err();
        assert_eq!(err, TokenValidationError::InvalidTimeWindow);
    }
}
