//! `talentbase-infra` — Postgres-backed stores and the transactional
//! invariant enforcer.
//!
//! Every query scopes by `company_id` (or `user_id`) in the WHERE clause, so
//! cross-tenant access is architecturally impossible; a scoping miss reads as
//! `NotFound`. Multi-row invariants (company bootstrap, ownership transfer,
//! primary-resume switch, application insert) run inside single transactions,
//! with `SELECT … FOR UPDATE` backing the count-then-act guards.

pub mod applications;
pub mod candidates;
pub mod companies;
pub mod db;
pub mod error;
pub mod jobs;
pub mod question_banks;
pub mod users;

pub use applications::ApplicationStore;
pub use candidates::CandidateStore;
pub use companies::{CompanyStore, MemberRecord};
pub use error::{StoreError, StoreResult};
pub use jobs::{JobPostingPatch, JobStore, NewJobPosting};
pub use question_banks::QuestionBankStore;
pub use users::{UserAccount, UserStore};
