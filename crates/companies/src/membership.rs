use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::{CompanyId, DomainError, MembershipId, Role, UserId};

/// Membership lifecycle status.
///
/// Invited members hold a row immediately (reserving the unique
/// (company, user) pair) but are not members for authorization purposes until
/// they accept. Revoked is terminal: a membership is never reactivated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Invited,
    Active,
    Revoked,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Invited => "invited",
            MembershipStatus::Active => "active",
            MembershipStatus::Revoked => "revoked",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "invited" => Ok(MembershipStatus::Invited),
            "active" => Ok(MembershipStatus::Active),
            "revoked" => Ok(MembershipStatus::Revoked),
            other => Err(DomainError::validation(format!(
                "membership status must be one of: invited, active, revoked (got '{other}')"
            ))),
        }
    }
}

impl core::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's membership in a company: the (company, user) relation carrying
/// role and status. Unique per (company, user); never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub role: Role,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// The bootstrap membership created together with the company.
    pub fn owner(company_id: CompanyId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: MembershipId::new(),
            company_id,
            user_id,
            role: Role::Owner,
            status: MembershipStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// A freshly invited membership, pending acceptance.
    pub fn invited(company_id: CompanyId, user_id: UserId, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: MembershipId::new(),
            company_id,
            user_id,
            role,
            status: MembershipStatus::Invited,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    /// INVITED → ACTIVE, performed by the invited actor.
    pub fn accept(&self) -> Result<MembershipStatus, DomainError> {
        match self.status {
            MembershipStatus::Invited => Ok(MembershipStatus::Active),
            MembershipStatus::Active => Err(DomainError::invalid_transition(
                "membership is already active",
            )),
            MembershipStatus::Revoked => Err(DomainError::invalid_transition(
                "membership has been revoked",
            )),
        }
    }

    /// INVITED/ACTIVE → REVOKED. Revoking an invite cancels it; REVOKED is
    /// terminal.
    pub fn revoke(&self) -> Result<MembershipStatus, DomainError> {
        match self.status {
            MembershipStatus::Invited | MembershipStatus::Active => Ok(MembershipStatus::Revoked),
            MembershipStatus::Revoked => Err(DomainError::invalid_transition(
                "membership is already revoked",
            )),
        }
    }

    /// Role changes apply to ACTIVE memberships only.
    pub fn ensure_role_changeable(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(
                "role can only change on an active membership",
            ))
        }
    }
}

/// Last-OWNER guard: demoting or revoking an OWNER must leave at least one
/// ACTIVE OWNER behind.
///
/// `active_owner_count` is the count observed *under lock* inside the same
/// transaction as the mutation (see the membership store).
pub fn ensure_owner_remains(target_role: Role, active_owner_count: i64) -> Result<(), DomainError> {
    if target_role == Role::Owner && active_owner_count <= 1 {
        return Err(DomainError::conflict(
            "company must retain at least one active owner",
        ));
    }
    Ok(())
}

/// Only an OWNER may demote or revoke another OWNER's membership.
pub fn ensure_can_modify(actor_role: Role, target_role: Role) -> Result<(), DomainError> {
    if target_role == Role::Owner && actor_role != Role::Owner {
        return Err(DomainError::Forbidden);
    }
    Ok(())
}

/// Roles grantable through invite or role-change.
///
/// OWNER is reachable only through ownership transfer, so the last-OWNER
/// accounting has a single entry point.
pub fn assignable_role(role: Role) -> Result<(), DomainError> {
    if role == Role::Owner {
        return Err(DomainError::validation(
            "ownership is granted via ownership transfer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn membership(status: MembershipStatus, role: Role) -> Membership {
        let now = Utc::now();
        Membership {
            id: MembershipId::new(),
            company_id: CompanyId::new(),
            user_id: UserId::new(),
            role,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn invite_accept_revoke_lifecycle() {
        let invited = membership(MembershipStatus::Invited, Role::Recruiter);
        assert_eq!(invited.accept().unwrap(), MembershipStatus::Active);
        assert_eq!(invited.revoke().unwrap(), MembershipStatus::Revoked);

        let active = membership(MembershipStatus::Active, Role::Recruiter);
        assert_eq!(active.revoke().unwrap(), MembershipStatus::Revoked);
        assert!(matches!(
            active.accept(),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[test]
    fn revoked_is_terminal() {
        let revoked = membership(MembershipStatus::Revoked, Role::Admin);
        assert!(matches!(
            revoked.accept(),
            Err(DomainError::InvalidTransition(_))
        ));
        assert!(matches!(
            revoked.revoke(),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[test]
    fn sole_owner_cannot_be_removed() {
        // Scenario: exactly one active OWNER; revoking or demoting it must
        // conflict, and the membership stays as it was.
        let err = ensure_owner_remains(Role::Owner, 1).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert!(ensure_owner_remains(Role::Owner, 2).is_ok());
        assert!(ensure_owner_remains(Role::Admin, 1).is_ok());
    }

    #[test]
    fn only_owners_touch_owner_rows() {
        assert!(ensure_can_modify(Role::Owner, Role::Owner).is_ok());
        assert_eq!(
            ensure_can_modify(Role::Admin, Role::Owner),
            Err(DomainError::Forbidden)
        );
        assert!(ensure_can_modify(Role::Admin, Role::Recruiter).is_ok());
    }

    #[test]
    fn owner_is_not_an_assignable_role() {
        assert!(matches!(
            assignable_role(Role::Owner),
            Err(DomainError::Validation(_))
        ));
        assert!(assignable_role(Role::Admin).is_ok());
        assert!(assignable_role(Role::Recruiter).is_ok());
    }

    /// Guarded operations against an in-memory membership table, mirroring
    /// what the store performs under row locks.
    #[derive(Debug, Clone)]
    enum Op {
        Revoke(usize),
        Demote(usize),
        Transfer { from: usize, to: usize },
    }

    fn apply(members: &mut [Membership], op: &Op) {
        let owner_count = members
            .iter()
            .filter(|m| m.role == Role::Owner && m.is_active())
            .count() as i64;

        match op {
            Op::Revoke(i) => {
                let target = &members[*i];
                if target.revoke().is_ok()
                    && ensure_owner_remains(target.role, owner_count).is_ok()
                {
                    members[*i].status = MembershipStatus::Revoked;
                }
            }
            Op::Demote(i) => {
                let target = &members[*i];
                if target.ensure_role_changeable().is_ok()
                    && ensure_owner_remains(target.role, owner_count).is_ok()
                {
                    members[*i].role = Role::Recruiter;
                }
            }
            Op::Transfer { from, to } => {
                let initiator_ok =
                    members[*from].role == Role::Owner && members[*from].is_active();
                let target_ok = members[*to].is_active() && from != to;
                if initiator_ok && target_ok {
                    members[*to].role = Role::Owner;
                    members[*from].role = Role::Admin;
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: starting from one active OWNER plus assorted members, no
        /// sequence of guarded revoke/demote/transfer operations drives the
        /// ACTIVE OWNER count to zero.
        #[test]
        fn active_owner_count_never_reaches_zero(
            statuses in proptest::collection::vec(0u8..3, 1..6),
            ops in proptest::collection::vec((0u8..3, 0usize..7, 0usize..7), 0..40),
        ) {
            let mut members = vec![membership(MembershipStatus::Active, Role::Owner)];
            for s in statuses {
                let status = match s {
                    0 => MembershipStatus::Invited,
                    1 => MembershipStatus::Active,
                    _ => MembershipStatus::Revoked,
                };
                members.push(membership(status, Role::Recruiter));
            }

            for (kind, a, b) in ops {
                let a = a % members.len();
                let b = b % members.len();
                let op = match kind {
                    0 => Op::Revoke(a),
                    1 => Op::Demote(a),
                    _ => Op::Transfer { from: a, to: b },
                };
                apply(&mut members, &op);

                let owners = members
                    .iter()
                    .filter(|m| m.role == Role::Owner && m.is_active())
                    .count();
                prop_assert!(owners >= 1);
            }
        }
    }
}
