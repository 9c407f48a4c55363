//! Minimal `HabitStore` trait and typed records for the hosted habit store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
mod day_key;
pub mod http_client;
pub mod retry;

pub use day_key::DayKey;

/// Row identifier for a habit in the backing store.
pub type HabitId = i64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn from_status(status: u16, body: String) -> Self {
        if body.is_empty() {
            StoreError::Config(format!("unexpected status: {status}"))
        } else {
            StoreError::Config(format!("unexpected status: {status} - {body}"))
        }
    }
}

/// Recorded intensity for completing a habit on a given day.
///
/// The derived order is the tier order: `Basic < Intermediate < Advanced`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

impl Level {
    /// The top tier; a "perfect" day requires every habit at this level.
    pub const fn highest() -> Self {
        Level::Advanced
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub category: String,
}

/// One stored log row. At most one exists per `(user, habit, day)`; the
/// store enforces this with upsert-on-conflict semantics.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct HabitLog {
    pub habit_id: HabitId,
    #[serde(rename = "done_on")]
    pub day: DayKey,
    // Legacy rows may carry no level; they decode as `basic`.
    #[serde(default)]
    pub level: Level,
}

/// The storage boundary the tracker core needs. Four operations, nothing
/// else; session lookup and profile data live outside this crate.
#[async_trait]
pub trait HabitStore: Send + Sync + 'static {
    /// Every habit in scope for the user (owned or shared via the link table).
    async fn fetch_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError>;

    /// Every log row for the user.
    async fn fetch_logs(&self, user_id: &str) -> Result<Vec<HabitLog>, StoreError>;

    /// Insert or replace the log for `(user_id, habit_id, day)`. Idempotent:
    /// repeated calls with the same arguments leave a single row.
    async fn upsert_log(
        &self,
        user_id: &str,
        habit_id: HabitId,
        day: DayKey,
        level: Level,
    ) -> Result<(), StoreError>;

    /// Remove the log for `(user_id, habit_id, day)`. Deleting a missing row
    /// is not an error.
    async fn delete_log(
        &self,
        user_id: &str,
        habit_id: HabitId,
        day: DayKey,
    ) -> Result<(), StoreError>;
}
