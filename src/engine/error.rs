//! Errors returned by scoring operations.

use crate::rules::RuleViolation;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The ball event breaks a scoring rule. Nothing was written.
    #[error("invalid ball: {0}")]
    Validation(#[from] RuleViolation),
    /// Match setup input was rejected.
    #[error("invalid match setup: {0}")]
    InvalidSetup(String),
    /// The innings is missing, completed, or not the one in play.
    #[error("innings order violation: {0}")]
    InningsOrder(String),
    /// The match is not in a state that allows the operation.
    #[error("match state conflict: {0}")]
    MatchState(String),
    #[error("innings {0} has no balls to undo")]
    NothingToUndo(u8),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(StoreError),
}

impl ScoringError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ScoringError::Validation(_) => "validation_error",
            ScoringError::InvalidSetup(_) => "invalid_setup",
            ScoringError::InningsOrder(_) => "innings_order",
            ScoringError::MatchState(_) => "match_state",
            ScoringError::NothingToUndo(_) => "nothing_to_undo",
            ScoringError::NotFound(_) => "not_found",
            ScoringError::Storage(StoreError::Timeout(_)) => "storage_timeout",
            ScoringError::Storage(_) => "storage_error",
        }
    }

    /// Whether the same call may succeed if retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Storage(e) if e.is_retryable())
    }
}

impl From<StoreError> for ScoringError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ScoringError::NotFound(what),
            other => ScoringError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: ScoringError = StoreError::NotFound("match 7".to_string()).into();
        assert_eq!(err, ScoringError::NotFound("match 7".to_string()));
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_only_transient_storage_errors_are_retryable() {
        assert!(ScoringError::from(StoreError::Timeout("op".to_string())).is_retryable());
        assert!(ScoringError::from(StoreError::Backend("io".to_string())).is_retryable());
        assert!(!ScoringError::from(StoreError::Conflict("dup".to_string())).is_retryable());
        assert!(!ScoringError::Validation(RuleViolation::DeadBallScored).is_retryable());
        assert!(!ScoringError::NothingToUndo(1).is_retryable());
    }

    #[test]
    fn test_validation_message_names_the_rule() {
        let err = ScoringError::from(RuleViolation::InvalidBatRuns { runs: 5 });
        assert_eq!(err.to_string(), "invalid ball: 5 runs off the bat is not a valid score");
        assert_eq!(err.code(), "validation_error");
    }
}
