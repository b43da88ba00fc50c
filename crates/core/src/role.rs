use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Membership role within a company.
///
/// The hierarchy is closed: there are exactly three roles and no per-role
/// permission lattice behind them. Which roles may perform an operation is
/// declared per operation (see `talentbase-auth`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Recruiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "recruiter" => Ok(Role::Recruiter),
            other => Err(DomainError::validation(format!(
                "role must be one of: owner, admin, recruiter (got '{other}')"
            ))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::Owner, Role::Admin, Role::Recruiter] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        let err = Role::parse("superuser").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
