use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::{ApplicationId, CommentId, CompanyId, UserId};

/// A company-side note on an application.
///
/// `company_id` is denormalized from the application at creation, write-once.
/// `visible_to_candidate` controls whether the comment is exposed outside the
/// company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationComment {
    pub id: CommentId,
    pub application_id: ApplicationId,
    pub company_id: CompanyId,
    pub author_id: UserId,
    pub body: String,
    pub visible_to_candidate: bool,
    pub created_at: DateTime<Utc>,
}
