use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::{DomainError, ResumeId, UserId};

/// A resume owned by one user. At most one resume per user is primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    pub id: ResumeId,
    pub user_id: UserId,
    pub title: String,
    pub file_url: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// The two-step plan for switching the primary resume: demote every other
/// primary, then promote the target. Both steps run in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimarySwitch {
    pub demote: Vec<ResumeId>,
    pub promote: ResumeId,
}

/// Plan a primary switch over the user's resumes (as loaded under lock).
///
/// Fails with `NotFound` when the target is not among them, which also covers
/// targets owned by someone else.
pub fn plan_primary_switch(
    resumes: &[Resume],
    target: ResumeId,
) -> Result<PrimarySwitch, DomainError> {
    if !resumes.iter().any(|r| r.id == target) {
        return Err(DomainError::NotFound);
    }

    let demote = resumes
        .iter()
        .filter(|r| r.is_primary && r.id != target)
        .map(|r| r.id)
        .collect();

    Ok(PrimarySwitch { demote, promote: target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resume(user_id: UserId, is_primary: bool) -> Resume {
        Resume {
            id: ResumeId::new(),
            user_id,
            title: "Resume".to_string(),
            file_url: None,
            is_primary,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn switch_demotes_the_previous_primary() {
        let user = UserId::new();
        let resumes = vec![resume(user, true), resume(user, false)];

        let plan = plan_primary_switch(&resumes, resumes[1].id).unwrap();
        assert_eq!(plan.demote, vec![resumes[0].id]);
        assert_eq!(plan.promote, resumes[1].id);
    }

    #[test]
    fn switching_to_the_current_primary_demotes_nothing() {
        let user = UserId::new();
        let resumes = vec![resume(user, true), resume(user, false)];

        let plan = plan_primary_switch(&resumes, resumes[0].id).unwrap();
        assert!(plan.demote.is_empty());
    }

    #[test]
    fn unknown_target_is_not_found() {
        let user = UserId::new();
        let resumes = vec![resume(user, true)];

        assert_eq!(
            plan_primary_switch(&resumes, ResumeId::new()),
            Err(DomainError::NotFound)
        );
    }

    fn apply(resumes: &mut Vec<Resume>, plan: &PrimarySwitch) {
        for r in resumes.iter_mut() {
            if plan.demote.contains(&r.id) {
                r.is_primary = false;
            }
        }
        for r in resumes.iter_mut() {
            if r.id == plan.promote {
                r.is_primary = true;
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of create/set-primary operations, the
        /// user owns exactly zero or one primary resume.
        #[test]
        fn at_most_one_primary_after_any_sequence(
            ops in proptest::collection::vec((0u8..2, any::<bool>(), 0usize..8), 0..30),
        ) {
            let user = UserId::new();
            let mut resumes: Vec<Resume> = Vec::new();

            for (kind, primary, idx) in ops {
                match kind {
                    // Create, with the same demote-then-insert sequence the
                    // store performs when `is_primary` is requested.
                    0 => {
                        if primary {
                            for r in resumes.iter_mut() {
                                r.is_primary = false;
                            }
                        }
                        resumes.push(resume(user, primary));
                    }
                    // Set-primary on an existing resume.
                    _ => {
                        if !resumes.is_empty() {
                            let target = resumes[idx % resumes.len()].id;
                            let plan = plan_primary_switch(&resumes, target).unwrap();
                            apply(&mut resumes, &plan);
                        }
                    }
                }

                let primaries = resumes.iter().filter(|r| r.is_primary).count();
                prop_assert!(primaries <= 1);
            }
        }
    }
}
