//! Consistent error responses: the domain taxonomy maps onto HTTP statuses in
//! exactly one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use talentbase_core::DomainError;
use talentbase_infra::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Handler-level error: everything a route can fail with.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Store(StoreError::Domain(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Store(err) => store_error_response(err),
            ApiError::Internal => {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
        }
    }
}

pub fn domain_error_response(err: &DomainError) -> Response {
    match err {
        DomainError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "unauthenticated")
        }
        DomainError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg.clone()),
        DomainError::InvalidTransition(msg) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_transition",
            msg.clone(),
        ),
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg.clone())
        }
    }
}

/// Storage failures are opaque to callers; domain outcomes map per taxonomy.
pub fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::Domain(domain) => domain_error_response(&domain),
        StoreError::Database(db) => {
            tracing::error!(error = %db, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden, StatusCode::FORBIDDEN),
            (DomainError::NotFound, StatusCode::NOT_FOUND),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (
                DomainError::invalid_transition("withdrawn"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(domain_error_response(&err).status(), status);
        }
    }

    #[test]
    fn database_errors_are_opaque_500s() {
        let response = store_error_response(StoreError::Database(sqlx::Error::RowNotFound));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
