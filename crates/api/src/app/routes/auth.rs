//! Registration and login. Both issue the 7-day bearer token.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use talentbase_auth::{hash_password, verify_password};
use talentbase_core::DomainError;

use crate::app::dto::{require_nonempty, LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    require_nonempty("email", &req.email)?;
    require_nonempty("full_name", &req.full_name)?;
    if req.password.len() < 8 {
        return Err(DomainError::validation("password must be at least 8 characters").into());
    }

    let password_hash = hash_password(&req.password).map_err(|_| ApiError::Internal)?;
    let account = services
        .users
        .create(req.email.trim(), &password_hash, req.full_name.trim(), Utc::now())
        .await?;

    let user = UserResponse {
        id: account.user_id(),
        email: account.email,
        full_name: account.full_name,
    };
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    // One failure path for bad email, bad password and inactive account:
    // login must not reveal which it was.
    let account = services
        .users
        .find_by_email(req.email.trim())
        .await?
        .filter(|a| a.is_active)
        .filter(|a| verify_password(&req.password, &a.password_hash))
        .ok_or(DomainError::Unauthenticated)?;

    let token = services
        .tokens
        .issue(account.user_id(), Utc::now())
        .map_err(|_| ApiError::Internal)?;

    Ok((StatusCode::OK, Json(TokenResponse { token })).into_response())
}
