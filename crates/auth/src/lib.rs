//! `talentbase-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token claims,
//! the HS256 codec, password hashing and the per-operation allowed-role sets
//! live here; loading users and memberships does not.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod token;

pub use authorize::{authorize, ops, RoleSet};
pub use claims::{validate_claims, AccessClaims, TokenValidationError, TOKEN_TTL_DAYS};
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{TokenCodec, TokenError};
