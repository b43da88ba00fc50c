//! Credential verifier (pipeline stage 1), applied as middleware to every
//! protected route.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::app::errors::{json_error, store_error_response};
use crate::app::services::AppServices;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Verify the bearer token, load the actor, and attach [`CurrentUser`].
///
/// Every failure mode is a 401: missing/malformed header, bad signature,
/// expired token, unknown actor, inactive actor.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .map_err(|msg| json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg))?;

    let claims = state.services.tokens.verify(token, Utc::now()).map_err(|_| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "invalid or expired token",
        )
    })?;

    let account = state
        .services
        .users
        .find_active(claims.sub)
        .await
        .map_err(store_error_response)?
        .ok_or_else(|| {
            json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "unknown or inactive actor",
            )
        })?;

    req.extensions_mut().insert(CurrentUser {
        user_id: account.user_id(),
        email: account.email,
        full_name: account.full_name,
    });

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing authorization header")?;

    let header = header.to_str().map_err(|_| "malformed authorization header")?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or("authorization header must use the Bearer scheme")?;

    let token = header.trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn extracts_a_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(extract_bearer(&headers).is_err());
    }

    #[test]
    fn empty_token_is_rejected() {
        let headers = headers_with("Bearer   ");
        assert!(extract_bearer(&headers).is_err());
    }
}
