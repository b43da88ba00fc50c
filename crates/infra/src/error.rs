//! Store error model and storage-error translation.
//!
//! Raw storage errors never cross this layer untranslated: uniqueness and
//! foreign-key violations become the `Conflict` the service-level pre-check
//! would have produced, and serialization conflicts are retried a bounded
//! number of times before surfacing.

use std::future::Future;

use thiserror::Error;

use talentbase_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Domain(DomainError::conflict(msg))
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Conflict message for a named uniqueness constraint.
pub(crate) fn conflict_message_for(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("applications_job_id_user_id_key") => "an application for this job already exists",
        Some("memberships_company_id_user_id_key") => "user is already a member of this company",
        Some("users_email_key") => "an account with this email already exists",
        Some("resumes_one_primary_per_user") => "another resume is already primary",
        _ => "resource already exists",
    }
}

/// Translate constraint violations into domain conflicts.
///
/// This is the backstop for races that slip past a friendly pre-check: the
/// caller sees the same `Conflict` either way.
pub fn translate_constraint(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return StoreError::conflict(conflict_message_for(db.constraint()));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::conflict("resource is referenced by other records");
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

pub(crate) fn is_retryable_code(code: &str) -> bool {
    code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED
}

fn is_retryable(err: &StoreError) -> bool {
    match err {
        StoreError::Database(sqlx::Error::Database(db)) => db
            .code()
            .is_some_and(|code| is_retryable_code(code.as_ref())),
        _ => false,
    }
}

pub const MAX_TX_RETRIES: u32 = 3;

/// Run a guarded transaction, retrying serialization failures and deadlocks a
/// small bounded number of times. Domain outcomes are never retried.
pub async fn retry_transient<T, Fut>(op: impl Fn() -> Fut) -> StoreResult<T>
where
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if is_retryable(&err) && attempt < MAX_TX_RETRIES => {
                attempt += 1;
                tracing::warn!(attempt, "retrying transaction after serialization conflict");
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_map_to_friendly_conflicts() {
        assert_eq!(
            conflict_message_for(Some("applications_job_id_user_id_key")),
            "an application for this job already exists"
        );
        assert_eq!(
            conflict_message_for(Some("memberships_company_id_user_id_key")),
            "user is already a member of this company"
        );
        assert_eq!(
            conflict_message_for(Some("users_email_key")),
            "an account with this email already exists"
        );
        assert_eq!(conflict_message_for(None), "resource already exists");
    }

    #[test]
    fn retryable_codes_are_serialization_and_deadlock() {
        assert!(is_retryable_code("40001"));
        assert!(is_retryable_code("40P01"));
        assert!(!is_retryable_code("23505"));
    }

    #[test]
    fn non_database_errors_pass_through_translation() {
        let err = translate_constraint(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn domain_errors_are_not_retried() {
        let calls = std::cell::Cell::new(0u32);

        let result: StoreResult<()> = retry_transient(|| {
            calls.set(calls.get() + 1);
            async { Err(StoreError::conflict("no")) }
        })
        .await;

        assert!(matches!(
            result,
            Err(StoreError::Domain(DomainError::Conflict(_)))
        ));
        assert_eq!(calls.get(), 1);
    }
}
