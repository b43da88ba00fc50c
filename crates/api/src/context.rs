//! Immutable request-context values for the access-decision pipeline.
//!
//! Ordering is enforced structurally: the auth middleware is the only producer
//! of [`CurrentUser`]; [`resolve_member`] consumes a `&CurrentUser` and is the
//! only producer of [`TenantMember`]; role checks only exist on
//! `TenantMember`. A later stage cannot run without the value of the earlier
//! one.

use talentbase_auth::{authorize, RoleSet};
use talentbase_core::{CompanyId, DomainError, Role, UserId};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// A verified actor identity (stage 1 output). Read-only.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
}

/// A resolved, ACTIVE membership for the current request (stage 2 output).
#[derive(Debug, Clone, Copy)]
pub struct TenantMember {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub role: Role,
}

impl TenantMember {
    /// Stage 3: check the member's role against the operation's declared set.
    pub fn require(&self, allowed: &RoleSet) -> Result<&Self, DomainError> {
        authorize(self.role, allowed)?;
        Ok(self)
    }
}

/// Stage 2: resolve the actor's ACTIVE membership in `company_id`.
///
/// A deleted or unknown company reads as `NotFound`; a missing, invited or
/// revoked membership is `Forbidden`.
pub async fn resolve_member(
    services: &AppServices,
    current: &CurrentUser,
    company_id: CompanyId,
) -> Result<TenantMember, ApiError> {
    services
        .companies
        .get(company_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let membership = services
        .companies
        .find_active_membership(company_id, current.user_id)
        .await?
        .ok_or(DomainError::Forbidden)?;

    Ok(TenantMember {
        company_id,
        user_id: current.user_id,
        role: membership.role,
    })
}
