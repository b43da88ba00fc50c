//! `talentbase-core` — shared identifiers, roles and the domain error model.
//!
//! This crate is intentionally free of HTTP, storage and async concerns.

pub mod error;
pub mod id;
pub mod role;

pub use error::{DomainError, DomainResult};
pub use id::{
    ApplicationId, CommentId, CompanyId, JobId, MembershipId, QuestionBankId, ResumeId, UserId,
};
pub use role::Role;
