//! Candidate profile and resume store.
//!
//! Primary-resume exclusivity is a demote-then-promote sequence inside one
//! transaction (with the user's rows locked), backed by the partial unique
//! index `resumes_one_primary_per_user`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use talentbase_candidates::{plan_primary_switch, CandidateProfile, Resume};
use talentbase_core::{ResumeId, UserId};

use crate::error::{retry_transient, translate_constraint, StoreError, StoreResult};

#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    user_id: Uuid,
    headline: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> CandidateProfile {
        CandidateProfile {
            user_id: UserId::from_uuid(self.user_id),
            headline: self.headline,
            summary: self.summary,
            location: self.location,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct ResumeRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    file_url: Option<String>,
    is_primary: bool,
    created_at: DateTime<Utc>,
}

impl ResumeRow {
    fn into_resume(self) -> Resume {
        Resume {
            id: ResumeId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            title: self.title,
            file_url: self.file_url,
            is_primary: self.is_primary,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone)]
pub struct CandidateStore {
    pool: PgPool,
}

impl CandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ── Profiles ────────────────────────────────────────────────────────────

    pub async fn get_profile(&self, user_id: UserId) -> StoreResult<Option<CandidateProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, headline, summary, location, updated_at
            FROM candidate_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    pub async fn upsert_profile(
        &self,
        user_id: UserId,
        headline: Option<&str>,
        summary: Option<&str>,
        location: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<CandidateProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO candidate_profiles (user_id, headline, summary, location, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET headline = COALESCE($2, candidate_profiles.headline),
                summary = COALESCE($3, candidate_profiles.summary),
                location = COALESCE($4, candidate_profiles.location),
                updated_at = $5
            RETURNING user_id, headline, summary, location, updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(headline)
        .bind(summary)
        .bind(location)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_profile())
    }

    // ── Resumes ─────────────────────────────────────────────────────────────

    pub async fn list_resumes(&self, user_id: UserId) -> StoreResult<Vec<Resume>> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, title, file_url, is_primary, created_at
            FROM resumes
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResumeRow::into_resume).collect())
    }

    /// Create a resume. When it is to be primary, every other primary is
    /// demoted first, in the same transaction.
    pub async fn create_resume(
        &self,
        user_id: UserId,
        title: &str,
        file_url: Option<&str>,
        is_primary: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<Resume> {
        retry_transient(|| self.try_create_resume(user_id, title, file_url, is_primary, now)).await
    }

    async fn try_create_resume(
        &self,
        user_id: UserId,
        title: &str,
        file_url: Option<&str>,
        is_primary: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<Resume> {
        let mut tx = self.pool.begin().await?;

        if is_primary {
            sqlx::query(
                r#"
                UPDATE resumes
                SET is_primary = FALSE
                WHERE user_id = $1 AND is_primary
                "#,
            )
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, title, file_url, is_primary, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, file_url, is_primary, created_at
            "#,
        )
        .bind(ResumeId::new().as_uuid())
        .bind(user_id.as_uuid())
        .bind(title)
        .bind(file_url)
        .bind(is_primary)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_constraint)?;

        tx.commit().await?;
        Ok(row.into_resume())
    }

    /// Switch the primary resume: demote every other primary, then promote
    /// the target, both in one transaction over the user's locked rows.
    pub async fn set_primary_resume(
        &self,
        user_id: UserId,
        resume_id: ResumeId,
    ) -> StoreResult<Resume> {
        retry_transient(|| self.try_set_primary_resume(user_id, resume_id)).await
    }

    async fn try_set_primary_resume(
        &self,
        user_id: UserId,
        resume_id: ResumeId,
    ) -> StoreResult<Resume> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, title, file_url, is_primary, created_at
            FROM resumes
            WHERE user_id = $1
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        let resumes: Vec<Resume> = rows.into_iter().map(ResumeRow::into_resume).collect();
        let plan = plan_primary_switch(&resumes, resume_id)?;

        for id in &plan.demote {
            sqlx::query("UPDATE resumes SET is_primary = FALSE WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("UPDATE resumes SET is_primary = TRUE WHERE id = $1")
            .bind(plan.promote.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(translate_constraint)?;

        tx.commit().await?;

        let mut resume = resumes
            .into_iter()
            .find(|r| r.id == resume_id)
            .ok_or_else(StoreError::not_found)?;
        resume.is_primary = true;
        Ok(resume)
    }

    /// Delete a resume. Applications referencing it keep their rows: the
    /// `resume_id` reference is nulled by the ON DELETE SET NULL rule. Any
    /// other FK violation still surfaces as a conflict.
    pub async fn delete_resume(&self, user_id: UserId, resume_id: ResumeId) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM resumes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(resume_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(translate_constraint)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }
}
