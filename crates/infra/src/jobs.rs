//! Job posting store: snapshot-on-create, soft deletion, and the set-based
//! deadline auto-close that runs ahead of listing reads.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use talentbase_core::{CompanyId, DomainError, JobId, QuestionBankId};
use talentbase_jobs::{JobPosting, JobStatus, ScreeningQuestion, Visibility};

use crate::error::{StoreError, StoreResult};
use crate::question_banks::fetch_bank_questions;

#[derive(Debug, Clone, FromRow)]
struct JobRow {
    id: Uuid,
    company_id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    visibility: String,
    application_deadline: Option<DateTime<Utc>>,
    screening_questions: Option<Json<Vec<ScreeningQuestion>>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl JobRow {
    fn into_posting(self) -> StoreResult<JobPosting> {
        Ok(JobPosting {
            id: JobId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            title: self.title,
            description: self.description,
            status: JobStatus::parse(&self.status).map_err(decode_err)?,
            visibility: Visibility::parse(&self.visibility).map_err(decode_err)?,
            application_deadline: self.application_deadline,
            screening_questions: self.screening_questions.map(|Json(q)| q),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

fn decode_err(e: DomainError) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(Box::new(e)))
}

const JOB_COLUMNS: &str = "id, company_id, title, description, status, visibility, \
     application_deadline, screening_questions, created_at, updated_at, deleted_at";

/// Fields for a new posting. Postings are always created DRAFT.
#[derive(Debug, Clone)]
pub struct NewJobPosting {
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub application_deadline: Option<DateTime<Utc>>,
    pub question_bank_id: Option<QuestionBankId>,
}

/// Updatable plain fields; `None` leaves a field unchanged. The questions
/// snapshot and the status are deliberately not updatable here.
#[derive(Debug, Clone, Default)]
pub struct JobPostingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub application_deadline: Option<Option<DateTime<Utc>>>,
}

#[derive(Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a posting; when a question bank is referenced, its current
    /// question list is deep-copied into the posting in the same transaction.
    /// The copy is by value: later bank edits never show through.
    pub async fn create(
        &self,
        company_id: CompanyId,
        new: NewJobPosting,
        now: DateTime<Utc>,
    ) -> StoreResult<JobPosting> {
        let mut tx = self.pool.begin().await?;

        let snapshot = match new.question_bank_id {
            Some(bank_id) => Some(
                fetch_bank_questions(&mut tx, company_id, bank_id)
                    .await?
                    .ok_or_else(StoreError::not_found)?,
            ),
            None => None,
        };

        let job_id = JobId::new();
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO job_postings
                (id, company_id, title, description, status, visibility,
                 application_deadline, screening_questions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'draft', $5, $6, $7, $8, $8)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.visibility.as_str())
        .bind(new.application_deadline)
        .bind(snapshot.map(Json))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_posting()
    }

    pub async fn get_for_company(
        &self,
        company_id: CompanyId,
        job_id: JobId,
    ) -> StoreResult<Option<JobPosting>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(job_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobRow::into_posting).transpose()
    }

    pub async fn list_for_company(&self, company_id: CompanyId) -> StoreResult<Vec<JobPosting>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE company_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobRow::into_posting).collect()
    }

    /// Fetch regardless of visibility/status (used for application admission;
    /// deleted postings stay invisible).
    pub async fn get(&self, job_id: JobId) -> StoreResult<Option<JobPosting>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(job_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobRow::into_posting).transpose()
    }

    pub async fn update(
        &self,
        company_id: CompanyId,
        job_id: JobId,
        patch: JobPostingPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<JobPosting> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(job_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(StoreError::not_found)?;

        let mut posting = row.into_posting()?;
        if let Some(title) = patch.title {
            posting.title = title;
        }
        if let Some(description) = patch.description {
            posting.description = Some(description);
        }
        if let Some(visibility) = patch.visibility {
            posting.visibility = visibility;
        }
        if let Some(deadline) = patch.application_deadline {
            posting.application_deadline = deadline;
        }
        posting.updated_at = now;

        sqlx::query(
            r#"
            UPDATE job_postings
            SET title = $2, description = $3, visibility = $4,
                application_deadline = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(posting.id.as_uuid())
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(posting.visibility.as_str())
        .bind(posting.application_deadline)
        .bind(posting.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(posting)
    }

    /// Explicit status change: unrestricted among draft/active/closed.
    pub async fn set_status(
        &self,
        company_id: CompanyId,
        job_id: JobId,
        status: JobStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<JobPosting> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE job_postings
            SET status = $3, updated_at = $4
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(StoreError::not_found)?;

        row.into_posting()
    }

    pub async fn soft_delete(
        &self,
        company_id: CompanyId,
        job_id: JobId,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings
            SET deleted_at = $3
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(job_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }

    /// Deadline-triggered auto-close: one set-based UPDATE moving every
    /// expired ACTIVE posting (optionally scoped to one company) to CLOSED.
    /// Idempotent: already-closed postings are not matched.
    pub async fn close_expired(
        &self,
        scope: Option<CompanyId>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings
            SET status = 'closed', updated_at = $1
            WHERE status = 'active'
              AND application_deadline IS NOT NULL
              AND application_deadline <= $1
              AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR company_id = $2)
            "#,
        )
        .bind(now)
        .bind(scope.map(|c| *c.as_uuid()))
        .execute(&self.pool)
        .await?;

        let closed = result.rows_affected();
        if closed > 0 {
            tracing::info!(closed, "auto-closed postings past their deadline");
        }
        Ok(closed)
    }

    /// Public browse: active, public, non-deleted postings.
    pub async fn list_public(&self) -> StoreResult<Vec<JobPosting>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE status = 'active' AND visibility = 'public' AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobRow::into_posting).collect()
    }

    /// Public detail: any public non-deleted posting (a closed posting's page
    /// still resolves, showing its closed status).
    pub async fn get_public(&self, job_id: JobId) -> StoreResult<Option<JobPosting>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE id = $1 AND visibility = 'public' AND deleted_at IS NULL
            "#
        ))
        .bind(job_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobRow::into_posting).transpose()
    }
}
