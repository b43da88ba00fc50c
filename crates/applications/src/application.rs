use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::{ApplicationId, CompanyId, DomainError, JobId, ResumeId, UserId};

/// Application lifecycle status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(DomainError::validation(format!(
                "application status must be one of: applied, accepted, rejected, withdrawn (got '{other}')"
            ))),
        }
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application: exactly one per (job, user) pair.
///
/// `company_id` is denormalized from the parent job at creation and never
/// updated (jobs never change company). `resume_id` is nullable because a
/// referenced resume may be deleted later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub status: ApplicationStatus,
    pub resume_id: Option<ResumeId>,
    pub answers: Option<serde_json::Value>,
    /// Who performed the last company-side status change.
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Company-side status change guard.
///
/// Company transitions are unrestricted among APPLIED/ACCEPTED/REJECTED;
/// WITHDRAWN is terminal for everyone, and is not a company-assignable target
/// (withdrawal belongs to the applicant).
pub fn review_transition(
    current: ApplicationStatus,
    requested: ApplicationStatus,
) -> Result<(), DomainError> {
    if requested == ApplicationStatus::Withdrawn {
        return Err(DomainError::validation(
            "withdrawal is performed by the applicant",
        ));
    }
    if current == ApplicationStatus::Withdrawn {
        return Err(DomainError::invalid_transition(
            "application has been withdrawn",
        ));
    }
    Ok(())
}

/// Candidate-side withdrawal guard: only APPLIED may be withdrawn.
pub fn withdraw_transition(current: ApplicationStatus) -> Result<(), DomainError> {
    match current {
        ApplicationStatus::Applied => Ok(()),
        ApplicationStatus::Accepted => Err(DomainError::invalid_transition(
            "accepted applications cannot be withdrawn",
        )),
        ApplicationStatus::Rejected => Err(DomainError::invalid_transition(
            "rejected applications cannot be withdrawn",
        )),
        ApplicationStatus::Withdrawn => Err(DomainError::invalid_transition(
            "application is already withdrawn",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use ApplicationStatus::*;

    #[test]
    fn company_may_move_freely_between_open_states() {
        for from in [Applied, Accepted, Rejected] {
            for to in [Applied, Accepted, Rejected] {
                assert!(review_transition(from, to).is_ok());
            }
        }
    }

    #[test]
    fn withdrawn_is_terminal_for_the_company() {
        for to in [Applied, Accepted, Rejected] {
            assert!(matches!(
                review_transition(Withdrawn, to),
                Err(DomainError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn company_cannot_withdraw_on_behalf_of_the_applicant() {
        for from in [Applied, Accepted, Rejected, Withdrawn] {
            assert!(matches!(
                review_transition(from, Withdrawn),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn only_applied_can_be_withdrawn() {
        assert!(withdraw_transition(Applied).is_ok());

        // Scenario: an accepted application stays accepted when the candidate
        // tries to withdraw.
        assert!(matches!(
            withdraw_transition(Accepted),
            Err(DomainError::InvalidTransition(_))
        ));
        assert!(matches!(
            withdraw_transition(Rejected),
            Err(DomainError::InvalidTransition(_))
        ));
        assert!(matches!(
            withdraw_transition(Withdrawn),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Review(ApplicationStatus),
        Withdraw,
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: once WITHDRAWN, no guarded sequence of company reviews or
        /// candidate withdrawals changes the status again.
        #[test]
        fn withdrawn_is_terminal_under_any_sequence(
            ops in proptest::collection::vec(0u8..5, 1..30),
        ) {
            let mut status = Applied;
            let mut withdrawn_since: Option<usize> = None;

            for (i, op) in ops.iter().enumerate() {
                let op = match op {
                    0 => Op::Review(Applied),
                    1 => Op::Review(Accepted),
                    2 => Op::Review(Rejected),
                    3 => Op::Review(Withdrawn),
                    _ => Op::Withdraw,
                };

                match op {
                    Op::Review(target) => {
                        if review_transition(status, target).is_ok() {
                            status = target;
                        }
                    }
                    Op::Withdraw => {
                        if withdraw_transition(status).is_ok() {
                            status = Withdrawn;
                            withdrawn_since.get_or_insert(i);
                        }
                    }
                }

                if withdrawn_since.is_some() {
                    prop_assert_eq!(status, Withdrawn);
                }
            }
        }
    }
}
