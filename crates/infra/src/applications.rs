//! Application store: duplicate prevention, guarded status transitions, and
//! comments.
//!
//! The duplicate pre-check exists for the friendlier error message; the
//! UNIQUE(job_id, user_id) constraint is the authoritative guard, and its
//! violation is translated into the same `Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use talentbase_applications::{
    review_transition, withdraw_transition, Application, ApplicationComment, ApplicationStatus,
};
use talentbase_core::{ApplicationId, CommentId, CompanyId, DomainError, JobId, ResumeId, UserId};
use talentbase_jobs::JobPosting;

use crate::error::{retry_transient, translate_constraint, StoreError, StoreResult};

#[derive(Debug, Clone, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    user_id: Uuid,
    company_id: Uuid,
    status: String,
    resume_id: Option<Uuid>,
    answers: Option<serde_json::Value>,
    reviewed_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    fn into_application(self) -> StoreResult<Application> {
        Ok(Application {
            id: ApplicationId::from_uuid(self.id),
            job_id: JobId::from_uuid(self.job_id),
            user_id: UserId::from_uuid(self.user_id),
            company_id: CompanyId::from_uuid(self.company_id),
            status: ApplicationStatus::parse(&self.status).map_err(decode_err)?,
            resume_id: self.resume_id.map(ResumeId::from_uuid),
            answers: self.answers,
            reviewed_by: self.reviewed_by.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct CommentRow {
    id: Uuid,
    application_id: Uuid,
    company_id: Uuid,
    author_id: Uuid,
    body: String,
    visible_to_candidate: bool,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> ApplicationComment {
        ApplicationComment {
            id: CommentId::from_uuid(self.id),
            application_id: ApplicationId::from_uuid(self.application_id),
            company_id: CompanyId::from_uuid(self.company_id),
            author_id: UserId::from_uuid(self.author_id),
            body: self.body,
            visible_to_candidate: self.visible_to_candidate,
            created_at: self.created_at,
        }
    }
}

fn decode_err(e: DomainError) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(Box::new(e)))
}

const APPLICATION_COLUMNS: &str = "id, job_id, user_id, company_id, status, resume_id, \
     answers, reviewed_by, created_at, updated_at";

#[derive(Clone)]
pub struct ApplicationStore {
    pool: PgPool,
}

impl ApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an application for `job`, denormalizing the job's company id
    /// (write-once; jobs never change company). One application per
    /// (job, user): pre-checked for the friendly message, constraint-backed
    /// for the race.
    pub async fn create(
        &self,
        job: &JobPosting,
        user_id: UserId,
        resume_id: Option<ResumeId>,
        answers: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM applications
            WHERE job_id = $1 AND user_id = $2
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(StoreError::conflict(
                "an application for this job already exists",
            ));
        }

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications
                (id, job_id, user_id, company_id, status, resume_id, answers,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'applied', $5, $6, $7, $7)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(ApplicationId::new().as_uuid())
        .bind(job.id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(job.company_id.as_uuid())
        .bind(resume_id.map(|r| *r.as_uuid()))
        .bind(answers)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_constraint)?;

        tx.commit().await?;
        row.into_application()
    }

    pub async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ApplicationRow::into_application).collect()
    }

    pub async fn get_for_user(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
    ) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(application_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationRow::into_application).transpose()
    }

    pub async fn list_for_job(
        &self,
        company_id: CompanyId,
        job_id: JobId,
    ) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE company_id = $1 AND job_id = $2
            ORDER BY created_at
            "#
        ))
        .bind(company_id.as_uuid())
        .bind(job_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ApplicationRow::into_application).collect()
    }

    /// Company-side status change. Guarded by [`review_transition`]; records
    /// who changed it.
    pub async fn review(
        &self,
        company_id: CompanyId,
        application_id: ApplicationId,
        requested: ApplicationStatus,
        reviewer: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        retry_transient(|| self.try_review(company_id, application_id, requested, reviewer, now))
            .await
    }

    async fn try_review(
        &self,
        company_id: CompanyId,
        application_id: ApplicationId,
        requested: ApplicationStatus,
        reviewer: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        let mut tx = self.pool.begin().await?;

        let mut application = lock_application(&mut tx, application_id)
            .await?
            .filter(|a| a.company_id == company_id)
            .ok_or_else(StoreError::not_found)?;

        review_transition(application.status, requested)?;

        application.status = requested;
        application.reviewed_by = Some(reviewer);
        application.updated_at = now;

        sqlx::query(
            r#"
            UPDATE applications
            SET status = $2, reviewed_by = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.status.as_str())
        .bind(reviewer.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(application)
    }

    /// Candidate-side withdrawal: APPLIED only; WITHDRAWN is terminal.
    pub async fn withdraw(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        retry_transient(|| self.try_withdraw(application_id, user_id, now)).await
    }

    async fn try_withdraw(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        let mut tx = self.pool.begin().await?;

        let mut application = lock_application(&mut tx, application_id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(StoreError::not_found)?;

        withdraw_transition(application.status)?;

        application.status = ApplicationStatus::Withdrawn;
        application.updated_at = now;

        sqlx::query(
            r#"
            UPDATE applications
            SET status = 'withdrawn', updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(application)
    }

    // ── Comments ────────────────────────────────────────────────────────────

    /// Add a company-side comment, denormalizing the application's company id.
    pub async fn add_comment(
        &self,
        company_id: CompanyId,
        application_id: ApplicationId,
        author: UserId,
        body: &str,
        visible_to_candidate: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<ApplicationComment> {
        let exists = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM applications
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(application_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        if exists.is_none() {
            return Err(StoreError::not_found());
        }

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO application_comments
                (id, application_id, company_id, author_id, body,
                 visible_to_candidate, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, application_id, company_id, author_id, body,
                      visible_to_candidate, created_at
            "#,
        )
        .bind(CommentId::new().as_uuid())
        .bind(application_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(author.as_uuid())
        .bind(body)
        .bind(visible_to_candidate)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment())
    }

    pub async fn list_comments(
        &self,
        company_id: CompanyId,
        application_id: ApplicationId,
    ) -> StoreResult<Vec<ApplicationComment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, application_id, company_id, author_id, body,
                   visible_to_candidate, created_at
            FROM application_comments
            WHERE application_id = $1 AND company_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(application_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    /// Candidate-visible comments on the candidate's own application.
    pub async fn list_comments_for_candidate(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
    ) -> StoreResult<Vec<ApplicationComment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.application_id, c.company_id, c.author_id, c.body,
                   c.visible_to_candidate, c.created_at
            FROM application_comments c
            JOIN applications a ON a.id = c.application_id
            WHERE c.application_id = $1
              AND a.user_id = $2
              AND c.visible_to_candidate
            ORDER BY c.created_at
            "#,
        )
        .bind(application_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }
}

async fn lock_application(
    tx: &mut Transaction<'_, Postgres>,
    application_id: ApplicationId,
) -> StoreResult<Option<Application>> {
    let row = sqlx::query_as::<_, ApplicationRow>(&format!(
        r#"
        SELECT {APPLICATION_COLUMNS}
        FROM applications
        WHERE id = $1
        FOR UPDATE
        "#
    ))
    .bind(application_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?;

    row.map(ApplicationRow::into_application).transpose()
}
