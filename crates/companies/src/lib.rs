//! `talentbase-companies` — the tenant (company) entity and the membership
//! lifecycle, including the last-OWNER guard.

pub mod company;
pub mod membership;

pub use company::Company;
pub use membership::{
    assignable_role, ensure_can_modify, ensure_owner_remains, Membership, MembershipStatus,
};
