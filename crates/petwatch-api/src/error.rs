use std::time::Duration;

use chrono::{DateTime, Utc};
use petwatch_db::DbError;
use petwatch_sim::care::CosmeticError;
use petwatch_sim::shield::{ShieldRejection, StreakStatus};

/// Everything a companion operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum PetError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not enough experience: have {available}, need {required}")]
    InsufficientResources { available: u64, required: u64 },

    #[error("on cooldown until {available_at}")]
    Cooldown { available_at: DateTime<Utc> },

    #[error("not eligible: streak is {0:?}")]
    NotEligible(StreakStatus),

    #[error("limit reached: {0}")]
    LimitReached(String),

    #[error("locked: {0}")]
    Locked(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Concurrent writers kept winning until the retry budget ran out.
    #[error("conflicting update on {0}")]
    Conflict(String),

    #[error("store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("store failure: {0}")]
    StoreFailure(#[source] DbError),
}

impl PetError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            PetError::NotFound(_) => "not_found",
            PetError::InvalidState(_) => "invalid_state",
            PetError::InsufficientResources { .. } => "insufficient_resources",
            PetError::Cooldown { .. } => "cooldown",
            PetError::NotEligible(_) => "not_eligible",
            PetError::LimitReached(_) => "limit_reached",
            PetError::Locked(_) => "locked",
            PetError::InvalidInput(_) => "invalid_input",
            PetError::Conflict(_) => "conflict",
            PetError::Timeout(_) => "timeout",
            PetError::StoreFailure(_) => "store_failure",
        }
    }
}

impl From<DbError> for PetError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(path) => PetError::NotFound(path),
            DbError::VersionConflict { path, .. } => PetError::Conflict(path),
            DbError::InvalidPath(path) => PetError::InvalidInput(format!("bad id in {path}")),
            other => PetError::StoreFailure(other),
        }
    }
}

impl From<ShieldRejection> for PetError {
    fn from(rejection: ShieldRejection) -> Self {
        match rejection {
            ShieldRejection::CompanionDead => {
                PetError::InvalidState("companion is dead".to_string())
            }
            ShieldRejection::InsufficientXp {
                available,
                required,
            } => PetError::InsufficientResources {
                available,
                required,
            },
            ShieldRejection::Cooldown { available_at } => PetError::Cooldown { available_at },
            ShieldRejection::NotEligible(status) => PetError::NotEligible(status),
        }
    }
}

impl From<CosmeticError> for PetError {
    fn from(e: CosmeticError) -> Self {
        PetError::Locked(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_conflict_becomes_conflict() {
        let err: PetError = DbError::VersionConflict {
            path: "users/u/pets/p".into(),
            expected: 1,
            found: 2,
        }
        .into();
        assert!(matches!(err, PetError::Conflict(path) if path == "users/u/pets/p"));
    }

    #[test]
    fn shield_rejections_keep_their_details() {
        let err: PetError = ShieldRejection::InsufficientXp {
            available: 10,
            required: 150,
        }
        .into();
        assert_eq!(err.code(), "insufficient_resources");
        assert_eq!(err.to_string(), "not enough experience: have 10, need 150");

        let err: PetError = ShieldRejection::NotEligible(StreakStatus::Lost).into();
        assert!(matches!(err, PetError::NotEligible(StreakStatus::Lost)));
    }

    #[test]
    fn store_errors_stay_store_failures() {
        let err: PetError = DbError::Unavailable("disk gone".into()).into();
        assert_eq!(err.code(), "store_failure");
    }
}
