//! Role authorization: per-operation allowed-role sets and the pure check.
//!
//! Each operation declares its allowed roles once as a `const` (no runtime
//! reflection, no annotations); the authorizer applies no business logic of
//! its own.

use talentbase_core::{DomainError, Role};

/// A statically declared set of roles permitted to perform an operation.
///
/// An empty set means "any active member": membership alone suffices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(&'static [Role]);

impl RoleSet {
    pub const fn new(roles: &'static [Role]) -> Self {
        Self(roles)
    }

    pub fn permits(&self, role: Role) -> bool {
        self.0.is_empty() || self.0.contains(&role)
    }

    pub fn roles(&self) -> &'static [Role] {
        self.0
    }
}

/// Authorize a resolved member's role against an operation's allowed set.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(role: Role, allowed: &RoleSet) -> Result<(), DomainError> {
    if allowed.permits(role) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// The fixed allowed-role sets, one per tenant-scoped write operation.
pub mod ops {
    use talentbase_core::Role;

    use super::RoleSet;

    /// Any active member; used by tenant-scoped reads.
    pub const ANY_MEMBER: RoleSet = RoleSet::new(&[]);

    pub const COMPANY_UPDATE: RoleSet = RoleSet::new(&[Role::Owner, Role::Admin]);
    pub const COMPANY_DELETE: RoleSet = RoleSet::new(&[Role::Owner]);

    /// Invite, role-change, revoke.
    pub const MEMBER_MANAGE: RoleSet = RoleSet::new(&[Role::Owner, Role::Admin]);
    pub const OWNERSHIP_TRANSFER: RoleSet = RoleSet::new(&[Role::Owner]);

    pub const QUESTION_BANK_MANAGE: RoleSet =
        RoleSet::new(&[Role::Owner, Role::Admin, Role::Recruiter]);
    pub const JOB_MANAGE: RoleSet = RoleSet::new(&[Role::Owner, Role::Admin, Role::Recruiter]);

    /// Application status change and comment-add.
    pub const APPLICATION_REVIEW: RoleSet =
        RoleSet::new(&[Role::Owner, Role::Admin, Role::Recruiter]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_permits_every_role() {
        for role in [Role::Owner, Role::Admin, Role::Recruiter] {
            assert!(authorize(role, &ops::ANY_MEMBER).is_ok());
        }
    }

    #[test]
    fn ownership_transfer_is_owner_only() {
        assert!(authorize(Role::Owner, &ops::OWNERSHIP_TRANSFER).is_ok());
        assert_eq!(
            authorize(Role::Admin, &ops::OWNERSHIP_TRANSFER),
            Err(DomainError::Forbidden)
        );
        assert_eq!(
            authorize(Role::Recruiter, &ops::OWNERSHIP_TRANSFER),
            Err(DomainError::Forbidden)
        );
    }

    #[test]
    fn member_management_excludes_recruiters() {
        assert!(authorize(Role::Owner, &ops::MEMBER_MANAGE).is_ok());
        assert!(authorize(Role::Admin, &ops::MEMBER_MANAGE).is_ok());
        assert_eq!(
            authorize(Role::Recruiter, &ops::MEMBER_MANAGE),
            Err(DomainError::Forbidden)
        );
    }

    #[test]
    fn job_and_review_operations_admit_all_three_roles() {
        for role in [Role::Owner, Role::Admin, Role::Recruiter] {
            assert!(authorize(role, &ops::JOB_MANAGE).is_ok());
            assert!(authorize(role, &ops::QUESTION_BANK_MANAGE).is_ok());
            assert!(authorize(role, &ops::APPLICATION_REVIEW).is_ok());
        }
    }
}
