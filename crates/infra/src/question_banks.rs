//! Question bank store. Banks are mutable; postings only ever hold by-value
//! copies of their content, so bank edits and deletes never touch a posting.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use talentbase_core::{CompanyId, QuestionBankId};
use talentbase_jobs::{QuestionBank, ScreeningQuestion};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, FromRow)]
struct QuestionBankRow {
    id: Uuid,
    company_id: Uuid,
    name: String,
    questions: Json<Vec<ScreeningQuestion>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuestionBankRow {
    fn into_bank(self) -> QuestionBank {
        QuestionBank {
            id: QuestionBankId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            name: self.name,
            questions: self.questions.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read a bank's current question list inside a caller-held transaction.
/// Scoped by company: a bank in another tenant reads as absent.
pub(crate) async fn fetch_bank_questions(
    tx: &mut Transaction<'_, Postgres>,
    company_id: CompanyId,
    bank_id: QuestionBankId,
) -> StoreResult<Option<Vec<ScreeningQuestion>>> {
    let questions = sqlx::query_scalar::<_, Json<Vec<ScreeningQuestion>>>(
        r#"
        SELECT questions
        FROM question_banks
        WHERE id = $1 AND company_id = $2
        "#,
    )
    .bind(bank_id.as_uuid())
    .bind(company_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?;

    Ok(questions.map(|Json(q)| q))
}

#[derive(Clone)]
pub struct QuestionBankStore {
    pool: PgPool,
}

impl QuestionBankStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: CompanyId,
        name: &str,
        questions: Vec<ScreeningQuestion>,
        now: DateTime<Utc>,
    ) -> StoreResult<QuestionBank> {
        let row = sqlx::query_as::<_, QuestionBankRow>(
            r#"
            INSERT INTO question_banks (id, company_id, name, questions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, company_id, name, questions, created_at, updated_at
            "#,
        )
        .bind(QuestionBankId::new().as_uuid())
        .bind(company_id.as_uuid())
        .bind(name)
        .bind(Json(questions))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_bank())
    }

    pub async fn get(
        &self,
        company_id: CompanyId,
        bank_id: QuestionBankId,
    ) -> StoreResult<Option<QuestionBank>> {
        let row = sqlx::query_as::<_, QuestionBankRow>(
            r#"
            SELECT id, company_id, name, questions, created_at, updated_at
            FROM question_banks
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(bank_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(QuestionBankRow::into_bank))
    }

    pub async fn list(&self, company_id: CompanyId) -> StoreResult<Vec<QuestionBank>> {
        let rows = sqlx::query_as::<_, QuestionBankRow>(
            r#"
            SELECT id, company_id, name, questions, created_at, updated_at
            FROM question_banks
            WHERE company_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuestionBankRow::into_bank).collect())
    }

    pub async fn update(
        &self,
        company_id: CompanyId,
        bank_id: QuestionBankId,
        name: Option<&str>,
        questions: Option<Vec<ScreeningQuestion>>,
        now: DateTime<Utc>,
    ) -> StoreResult<QuestionBank> {
        let row = sqlx::query_as::<_, QuestionBankRow>(
            r#"
            UPDATE question_banks
            SET name = COALESCE($3, name),
                questions = COALESCE($4, questions),
                updated_at = $5
            WHERE id = $1 AND company_id = $2
            RETURNING id, company_id, name, questions, created_at, updated_at
            "#,
        )
        .bind(bank_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(name)
        .bind(questions.map(Json))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(StoreError::not_found)?;

        Ok(row.into_bank())
    }

    /// Banks hard-delete: postings hold copies, nothing references a bank.
    pub async fn delete(&self, company_id: CompanyId, bank_id: QuestionBankId) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM question_banks
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(bank_id.as_uuid())
        .bind(company_id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }
}
