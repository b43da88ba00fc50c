//! Public job browsing: no pipeline stages.
//!
//! Deadline auto-close runs ahead of every listing read, so no reader ever
//! observes an expired posting as ACTIVE.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use talentbase_core::{DomainError, JobId};
use talentbase_jobs::JobStatus;

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:job_id", get(get_job))
}

async fn list_jobs(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Response> {
    services.jobs.close_expired(None, Utc::now()).await?;
    let jobs = services.jobs.list_public().await?;
    Ok((StatusCode::OK, Json(jobs)).into_response())
}

async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Response> {
    let job_id = JobId::from_uuid(job_id);
    let now = Utc::now();

    let mut job = services
        .jobs
        .get_public(job_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    // The read must observe the deadline transition.
    if job.status == JobStatus::Active && job.deadline_passed(now) {
        services.jobs.close_expired(Some(job.company_id), now).await?;
        job = services
            .jobs
            .get_public(job_id)
            .await?
            .ok_or(DomainError::NotFound)?;
    }

    Ok((StatusCode::OK, Json(job)).into_response())
}
