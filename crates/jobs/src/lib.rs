//! `talentbase-jobs` — job postings, their lifecycle, and question banks with
//! snapshot-on-create semantics.

pub mod posting;
pub mod question_bank;

pub use posting::{JobPosting, JobStatus, Visibility};
pub use question_bank::{QuestionBank, QuestionKind, ScreeningQuestion};
