use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::{CompanyId, DomainError, JobId};

use crate::question_bank::ScreeningQuestion;

/// Job posting lifecycle status.
///
/// Explicit status changes are unrestricted among the three values; the one
/// automatic transition is ACTIVE → CLOSED when the application deadline
/// passes, applied set-based before listing reads (see the job store).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            other => Err(DomainError::validation(format!(
                "job status must be one of: draft, active, closed (got '{other}')"
            ))),
        }
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(DomainError::validation(format!(
                "visibility must be one of: public, private (got '{other}')"
            ))),
        }
    }
}

impl core::fmt::Display for Visibility {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting.
///
/// `screening_questions` is a by-value snapshot taken from a question bank at
/// creation; it is immutable afterwards regardless of later bank edits.
/// Soft deletion is orthogonal to status and excludes the posting from every
/// default read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: Option<String>,
    pub status: JobStatus,
    pub visibility: Visibility,
    pub application_deadline: Option<DateTime<Utc>>,
    pub screening_questions: Option<Vec<ScreeningQuestion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        matches!(self.application_deadline, Some(d) if d <= now)
    }

    /// Whether an application may be admitted right now.
    pub fn ensure_open_for_applications(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_deleted() {
            return Err(DomainError::NotFound);
        }
        if self.status != JobStatus::Active || self.deadline_passed(now) {
            return Err(DomainError::conflict("job is not open for applications"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn posting(status: JobStatus, deadline: Option<DateTime<Utc>>) -> JobPosting {
        let now = Utc::now();
        JobPosting {
            id: JobId::new(),
            company_id: CompanyId::new(),
            title: "Backend Engineer".to_string(),
            description: None,
            status,
            visibility: Visibility::Public,
            application_deadline: deadline,
            screening_questions: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn statuses_round_trip_through_text() {
        for status in [JobStatus::Draft, JobStatus::Active, JobStatus::Closed] {
            assert_eq!(JobStatus::parse(status.as_str()).unwrap(), status);
        }
        for vis in [Visibility::Public, Visibility::Private] {
            assert_eq!(Visibility::parse(vis.as_str()).unwrap(), vis);
        }
    }

    #[test]
    fn active_posting_without_deadline_admits_applications() {
        let job = posting(JobStatus::Active, None);
        assert!(job.ensure_open_for_applications(Utc::now()).is_ok());
    }

    #[test]
    fn expired_deadline_rejects_applications() {
        let now = Utc::now();
        let job = posting(JobStatus::Active, Some(now - Duration::hours(1)));

        assert!(job.deadline_passed(now));
        assert!(matches!(
            job.ensure_open_for_applications(now),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn deadline_boundary_counts_as_passed() {
        let now = Utc::now();
        let job = posting(JobStatus::Active, Some(now));
        assert!(job.deadline_passed(now));
    }

    #[test]
    fn draft_and_closed_postings_reject_applications() {
        for status in [JobStatus::Draft, JobStatus::Closed] {
            let job = posting(status, None);
            assert!(matches!(
                job.ensure_open_for_applications(Utc::now()),
                Err(DomainError::Conflict(_))
            ));
        }
    }

    #[test]
    fn deleted_posting_is_not_found() {
        let mut job = posting(JobStatus::Active, None);
        job.deleted_at = Some(Utc::now());

        assert!(matches!(
            job.ensure_open_for_applications(Utc::now()),
            Err(DomainError::NotFound)
        ));
    }
}
