//! `talentbase-candidates` — candidate profiles and resumes, including the
//! primary-resume exclusivity rules.

pub mod profile;
pub mod resume;

pub use profile::CandidateProfile;
pub use resume::{plan_primary_switch, PrimarySwitch, Resume};
