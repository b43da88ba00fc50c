//! Tenant-scoped job posting and question bank routes.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use talentbase_auth::ops;
use talentbase_core::{CompanyId, DomainError, JobId, QuestionBankId};
use talentbase_infra::{JobPostingPatch, NewJobPosting};
use talentbase_jobs::{JobStatus, Visibility};

use crate::app::dto::{
    require_nonempty, CreateJobRequest, CreateQuestionBankRequest, JobStatusRequest,
    UpdateJobRequest, UpdateQuestionBankRequest,
};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::{resolve_member, CurrentUser};

pub fn router() -> Router {
    Router::new()
        .route(
            "/companies/:company_id/jobs",
            get(list_jobs).post(create_job),
        )
        .route(
            "/companies/:company_id/jobs/:job_id",
            get(get_job).put(update_job).delete(delete_job),
        )
        .route("/companies/:company_id/jobs/:job_id/status", put(set_job_status))
        .route(
            "/companies/:company_id/question-banks",
            get(list_banks).post(create_bank),
        )
        .route(
            "/companies/:company_id/question-banks/:bank_id",
            get(get_bank).put(update_bank).delete(delete_bank),
        )
}

// ── Jobs ─────────────────────────────────────────────────────────────────────

async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    // Listing reads observe the deadline transition.
    services.jobs.close_expired(Some(company_id), Utc::now()).await?;

    let jobs = services.jobs.list_for_company(company_id).await?;
    Ok((StatusCode::OK, Json(jobs)).into_response())
}

async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<CreateJobRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::JOB_MANAGE)?;

    require_nonempty("title", &req.title)?;
    let visibility = match req.visibility.as_deref() {
        Some(v) => Visibility::parse(v)?,
        None => Visibility::Public,
    };

    let new = NewJobPosting {
        title: req.title.trim().to_string(),
        description: req.description,
        visibility,
        application_deadline: req.application_deadline,
        question_bank_id: req.question_bank_id.map(QuestionBankId::from_uuid),
    };

    let job = services.jobs.create(company_id, new, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, job_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    services.jobs.close_expired(Some(company_id), Utc::now()).await?;

    let job = services
        .jobs
        .get_for_company(company_id, JobId::from_uuid(job_id))
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok((StatusCode::OK, Json(job)).into_response())
}

async fn update_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, job_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateJobRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::JOB_MANAGE)?;

    if let Some(title) = &req.title {
        require_nonempty("title", title)?;
    }
    let visibility = match req.visibility.as_deref() {
        Some(v) => Some(Visibility::parse(v)?),
        None => None,
    };

    let patch = JobPostingPatch {
        title: req.title.map(|t| t.trim().to_string()),
        description: req.description,
        visibility,
        application_deadline: req.application_deadline.map(Some),
    };

    let job = services
        .jobs
        .update(company_id, JobId::from_uuid(job_id), patch, Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(job)).into_response())
}

async fn set_job_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, job_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<JobStatusRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::JOB_MANAGE)?;

    let status = JobStatus::parse(&req.status)?;
    let job = services
        .jobs
        .set_status(company_id, JobId::from_uuid(job_id), status, Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(job)).into_response())
}

async fn delete_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, job_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::JOB_MANAGE)?;

    services
        .jobs
        .soft_delete(company_id, JobId::from_uuid(job_id), Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// ── Question banks ───────────────────────────────────────────────────────────

async fn list_banks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    let banks = services.question_banks.list(company_id).await?;
    Ok((StatusCode::OK, Json(banks)).into_response())
}

async fn create_bank(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<CreateQuestionBankRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::QUESTION_BANK_MANAGE)?;

    require_nonempty("name", &req.name)?;
    for question in &req.questions {
        question.validate()?;
    }

    let bank = services
        .question_banks
        .create(company_id, req.name.trim(), req.questions, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(bank)).into_response())
}

async fn get_bank(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, bank_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    let bank = services
        .question_banks
        .get(company_id, QuestionBankId::from_uuid(bank_id))
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok((StatusCode::OK, Json(bank)).into_response())
}

async fn update_bank(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, bank_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateQuestionBankRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::QUESTION_BANK_MANAGE)?;

    if let Some(name) = &req.name {
        require_nonempty("name", name)?;
    }
    if let Some(questions) = &req.questions {
        for question in questions {
            question.validate()?;
        }
    }

    let bank = services
        .question_banks
        .update(
            company_id,
            QuestionBankId::from_uuid(bank_id),
            req.name.as_deref(),
            req.questions,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::OK, Json(bank)).into_response())
}

async fn delete_bank(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, bank_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::QUESTION_BANK_MANAGE)?;

    services
        .question_banks
        .delete(company_id, QuestionBankId::from_uuid(bank_id))
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
