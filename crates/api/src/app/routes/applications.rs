//! Tenant-scoped application review routes.

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

use talentbase_applications::ApplicationStatus;
use talentbase_auth::ops;
use talentbase_core::{ApplicationId, CompanyId, JobId};

use crate::app::dto::{require_nonempty, AddCommentRequest, ApplicationStatusRequest};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::{resolve_member, CurrentUser};

pub fn router() -> Router {
    Router::new()
        .route(
            "/companies/:company_id/jobs/:job_id/applications",
            get(list_applications),
        )
        .route(
            "/companies/:company_id/applications/:application_id/status",
            put(set_status),
        )
        .route(
            "/companies/:company_id/applications/:application_id/comments",
            get(list_comments).post(add_comment),
        )
}

async fn list_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, job_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    let applications = services
        .applications
        .list_for_job(company_id, JobId::from_uuid(job_id))
        .await?;
    Ok((StatusCode::OK, Json(applications)).into_response())
}

async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, application_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ApplicationStatusRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::APPLICATION_REVIEW)?;

    let requested = ApplicationStatus::parse(&req.status)?;
    let application = services
        .applications
        .review(
            company_id,
            ApplicationId::from_uuid(application_id),
            requested,
            member.user_id,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::OK, Json(application)).into_response())
}

async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, application_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    let comments = services
        .applications
        .list_comments(company_id, ApplicationId::from_uuid(application_id))
        .await?;
    Ok((StatusCode::OK, Json(comments)).into_response())
}

async fn add_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, application_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::APPLICATION_REVIEW)?;

    require_nonempty("body", &req.body)?;

    let comment = services
        .applications
        .add_comment(
            company_id,
            ApplicationId::from_uuid(application_id),
            member.user_id,
            &req.body,
            req.visible_to_candidate,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}
