//! Habit-tracking core: the in-memory log index, date-windowed aggregation,
//! day-level edit staging, and rule-based tips, tied together by a
//! [`TrackerSession`] that owns them for the life of a view session.

pub mod aggregate;
pub mod error;
pub mod log_index;
pub mod session;
pub mod staging;
mod test_utils;
pub mod tips;

pub use aggregate::{MonthPoint, ProgressStats, Window};
pub use error::{CommitFailure, TrackerError, TrackerResult};
pub use log_index::LogIndex;
pub use session::TrackerSession;
pub use staging::{CancelOutcome, Confirm, DayEditor};
pub use tips::{Tip, TipKind};
