//! User account store (credential-verifier reads + registration writes).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use talentbase_core::UserId;

use crate::error::{translate_constraint, StoreResult};

/// A user account row.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }
}

#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account. A duplicate email surfaces as `Conflict` via the
    /// `users_email_key` constraint.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<UserAccount> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, is_active, created_at)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING id, email, password_hash, full_name, is_active, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_constraint)?;

        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, email, password_hash, full_name, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// The credential verifier's lookup: the actor must exist and be active.
    pub async fn find_active(&self, user_id: UserId) -> StoreResult<Option<UserAccount>> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, email, password_hash, full_name, is_active, created_at
            FROM users
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<UserAccount>> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, email, password_hash, full_name, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
