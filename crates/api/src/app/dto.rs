//! Request DTOs and small parsing helpers.
//!
//! Domain entities serialize directly as responses (ids are transparent,
//! enums lowercase); only requests and joined views need dedicated types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use talentbase_companies::MembershipStatus;
use talentbase_core::{DomainError, Role, UserId};
use talentbase_infra::MemberRecord;
use talentbase_jobs::ScreeningQuestion;

pub fn require_nonempty(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

// ── Me ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub resume_id: Option<Uuid>,
    pub answers: Option<serde_json::Value>,
}

// ── Companies ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnershipRequest {
    pub user_id: Uuid,
}

/// Membership joined with account fields, for member listings.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

impl From<MemberRecord> for MemberResponse {
    fn from(record: MemberRecord) -> Self {
        Self {
            user_id: record.membership.user_id,
            email: record.email,
            full_name: record.full_name,
            role: record.membership.role,
            status: record.membership.status,
            created_at: record.membership.created_at,
        }
    }
}

// ── Question banks ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateQuestionBankRequest {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<ScreeningQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuestionBankRequest {
    pub name: Option<String>,
    pub questions: Option<Vec<ScreeningQuestion>>,
}

// ── Jobs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "public".
    pub visibility: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub question_bank_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub status: String,
}

// ── Applications ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub body: String,
    #[serde(default)]
    pub visible_to_candidate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonempty_rejects_whitespace() {
        assert!(require_nonempty("name", "  ").is_err());
        assert!(require_nonempty("name", "Acme").is_ok());
    }
}
