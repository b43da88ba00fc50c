use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::UserId;

/// A user's candidate profile (zero-or-one per user, plain fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: UserId,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub updated_at: DateTime<Utc>,
}
