use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbase_core::CompanyId;

/// A company: the multi-tenant boundary.
///
/// Soft-deletable; a deleted company is excluded from every default read but
/// its rows (memberships, jobs) are never purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Company {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
