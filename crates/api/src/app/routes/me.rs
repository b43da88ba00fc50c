//! Actor-scoped routes (credential verifier only): profile, resumes, own
//! applications.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use talentbase_core::{ApplicationId, DomainError, JobId, ResumeId};
use talentbase_jobs::JobStatus;

use crate::app::dto::{require_nonempty, ApplyRequest, CreateResumeRequest, UpdateProfileRequest};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/me/profile", get(get_profile).put(update_profile))
        .route("/me/resumes", get(list_resumes).post(create_resume))
        .route("/me/resumes/:resume_id/primary", put(set_primary_resume))
        .route("/me/resumes/:resume_id", delete(delete_resume))
        .route("/me/applications", get(list_applications))
        .route("/me/applications/:application_id/withdraw", post(withdraw))
        .route(
            "/me/applications/:application_id/comments",
            get(list_visible_comments),
        )
        .route("/jobs/:job_id/apply", post(apply))
}

// ── Profile ──────────────────────────────────────────────────────────────────

async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let profile = services
        .candidates
        .get_profile(current.user_id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok((StatusCode::OK, Json(profile)).into_response())
}

async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Response> {
    let profile = services
        .candidates
        .upsert_profile(
            current.user_id,
            req.headline.as_deref(),
            req.summary.as_deref(),
            req.location.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::OK, Json(profile)).into_response())
}

// ── Resumes ──────────────────────────────────────────────────────────────────

async fn list_resumes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let resumes = services.candidates.list_resumes(current.user_id).await?;
    Ok((StatusCode::OK, Json(resumes)).into_response())
}

async fn create_resume(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateResumeRequest>,
) -> ApiResult<Response> {
    require_nonempty("title", &req.title)?;

    let resume = services
        .candidates
        .create_resume(
            current.user_id,
            req.title.trim(),
            req.file_url.as_deref(),
            req.is_primary,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(resume)).into_response())
}

async fn set_primary_resume(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(resume_id): Path<Uuid>,
) -> ApiResult<Response> {
    let resume = services
        .candidates
        .set_primary_resume(current.user_id, ResumeId::from_uuid(resume_id))
        .await?;
    Ok((StatusCode::OK, Json(resume)).into_response())
}

async fn delete_resume(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(resume_id): Path<Uuid>,
) -> ApiResult<Response> {
    services
        .candidates
        .delete_resume(current.user_id, ResumeId::from_uuid(resume_id))
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// ── Applications ─────────────────────────────────────────────────────────────

async fn apply(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<Response> {
    let job_id = JobId::from_uuid(job_id);
    let now = Utc::now();

    let mut job = services.jobs.get(job_id).await?.ok_or(DomainError::NotFound)?;

    // Admission evaluates the deadline: an expired posting closes first and
    // then rejects, exactly as a listing read would have shown it.
    if job.status == JobStatus::Active && job.deadline_passed(now) {
        services.jobs.close_expired(Some(job.company_id), now).await?;
        job = services.jobs.get(job_id).await?.ok_or(DomainError::NotFound)?;
    }
    job.ensure_open_for_applications(now)?;

    let resume_id = match req.resume_id {
        Some(id) => {
            let id = ResumeId::from_uuid(id);
            let owned = services
                .candidates
                .list_resumes(current.user_id)
                .await?
                .iter()
                .any(|r| r.id == id);
            if !owned {
                // Someone else's resume reads as absent.
                return Err(DomainError::NotFound.into());
            }
            Some(id)
        }
        None => None,
    };

    let application = services
        .applications
        .create(&job, current.user_id, resume_id, req.answers, now)
        .await?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

async fn list_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let applications = services.applications.list_for_user(current.user_id).await?;
    Ok((StatusCode::OK, Json(applications)).into_response())
}

async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(application_id): Path<Uuid>,
) -> ApiResult<Response> {
    let application = services
        .applications
        .withdraw(
            ApplicationId::from_uuid(application_id),
            current.user_id,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::OK, Json(application)).into_response())
}

async fn list_visible_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(application_id): Path<Uuid>,
) -> ApiResult<Response> {
    let application_id = ApplicationId::from_uuid(application_id);

    // Scope check first: an application that isn't the caller's is absent.
    services
        .applications
        .get_for_user(application_id, current.user_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let comments = services
        .applications
        .list_comments_for_candidate(application_id, current.user_id)
        .await?;
    Ok((StatusCode::OK, Json(comments)).into_response())
}
