//! Company and membership routes (tenant-scoped, except creation and invite
//! acceptance which are actor-scoped).

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

use talentbase_auth::ops;
use talentbase_core::{CompanyId, DomainError, Role, UserId};

use crate::app::dto::{
    require_nonempty, ChangeRoleRequest, CreateCompanyRequest, InviteMemberRequest,
    MemberResponse, TransferOwnershipRequest, UpdateCompanyRequest,
};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::{resolve_member, CurrentUser};

pub fn router() -> Router {
    Router::new()
        .route("/companies", post(create_company))
        .route(
            "/companies/:company_id",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/companies/:company_id/members", get(list_members).post(invite_member))
        .route("/companies/:company_id/members/accept", post(accept_invite))
        .route("/companies/:company_id/members/:user_id/role", put(change_role))
        .route("/companies/:company_id/members/:user_id", delete(revoke_member))
        .route(
            "/companies/:company_id/ownership-transfer",
            post(transfer_ownership),
        )
}

async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateCompanyRequest>,
) -> ApiResult<Response> {
    require_nonempty("name", &req.name)?;

    let (company, _membership) = services
        .companies
        .create(
            current.user_id,
            req.name.trim(),
            req.description.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(company)).into_response())
}

async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    let company = services
        .companies
        .get(company_id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok((StatusCode::OK, Json(company)).into_response())
}

async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::COMPANY_UPDATE)?;

    if let Some(name) = &req.name {
        require_nonempty("name", name)?;
    }

    let company = services
        .companies
        .update(company_id, req.name.as_deref(), req.description.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(company)).into_response())
}

async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::COMPANY_DELETE)?;

    services.companies.soft_delete(company_id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// ── Members ──────────────────────────────────────────────────────────────────

async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    resolve_member(&services, &current, company_id).await?;

    let members: Vec<MemberResponse> = services
        .companies
        .list_members(company_id)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();
    Ok((StatusCode::OK, Json(members)).into_response())
}

async fn invite_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<InviteMemberRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::MEMBER_MANAGE)?;

    let role = Role::parse(&req.role)?;
    let target = services
        .users
        .find_by_email(req.email.trim())
        .await?
        .ok_or(DomainError::NotFound)?;

    let membership = services
        .companies
        .invite(company_id, target.user_id(), role, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(membership)).into_response())
}

/// The invited actor activates their own INVITED membership. Runs behind the
/// credential verifier only: the actor has no ACTIVE membership yet.
async fn accept_invite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let membership = services
        .companies
        .accept_invite(company_id, current.user_id, Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(membership)).into_response())
}

async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::MEMBER_MANAGE)?;

    let new_role = Role::parse(&req.role)?;
    let membership = services
        .companies
        .change_role(
            company_id,
            member.role,
            UserId::from_uuid(user_id),
            new_role,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::OK, Json(membership)).into_response())
}

async fn revoke_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::MEMBER_MANAGE)?;

    let membership = services
        .companies
        .revoke(company_id, member.role, UserId::from_uuid(user_id), Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(membership)).into_response())
}

async fn transfer_ownership(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<TransferOwnershipRequest>,
) -> ApiResult<Response> {
    let company_id = CompanyId::from_uuid(company_id);
    let member = resolve_member(&services, &current, company_id).await?;
    member.require(&ops::OWNERSHIP_TRANSFER)?;

    services
        .companies
        .transfer_ownership(
            company_id,
            member.user_id,
            UserId::from_uuid(req.user_id),
            Utc::now(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
