//! Error types for the tracker core.

use habit_store_client::{HabitId, StoreError};
use thiserror::Error;

/// One staged entry that failed to commit during [`save_day`].
///
/// [`save_day`]: crate::TrackerSession::save_day
#[derive(Debug)]
pub struct CommitFailure {
    pub habit_id: HabitId,
    pub error: StoreError,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("validation error: {0}")]
    Validation(String),

    /// Some staged entries committed, the listed ones did not. The failed
    /// entries stay staged so a retry resubmits only those.
    #[error("commit incomplete: {} of the staged entries failed", .0.len())]
    PartialCommit(Vec<CommitFailure>),
}

/// Result type alias for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_commit_reports_failure_count() {
        let err = TrackerError::PartialCommit(vec![CommitFailure {
            habit_id: 3,
            error: StoreError::Config("down".into()),
        }]);
        assert_eq!(err.to_string(), "commit incomplete: 1 of the staged entries failed");
    }
}
