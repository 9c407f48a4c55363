//! The view-session context object.
//!
//! A `TrackerSession` owns the habit list, the log index, and at most one
//! open day editor for the duration of a view session. The storage client is
//! injected at construction and resolved exactly once; nothing here lives at
//! module level.

use crate::aggregate::{self, MonthPoint, ProgressStats, Window};
use crate::error::{CommitFailure, TrackerError, TrackerResult};
use crate::log_index::LogIndex;
use crate::staging::{CancelOutcome, Confirm, DayEditor};
use crate::tips::{self, Tip};
use futures_util::future::join_all;
use habit_store_client::retry::RetryPolicy;
use habit_store_client::{DayKey, Habit, HabitId, HabitStore, Level};
use std::collections::HashMap;
use std::sync::Arc;

pub struct TrackerSession {
    store: Arc<dyn HabitStore>,
    user_id: String,
    habits: Vec<Habit>,
    index: LogIndex,
    editor: Option<DayEditor>,
}

impl TrackerSession {
    /// Fetch the user's habits and logs and build the session state.
    ///
    /// Fetches are retried; a fetch that still fails degrades to an empty
    /// list, so the session comes up with zeroed statistics instead of an
    /// error. The user just sees no data until a reload.
    pub async fn load(store: Arc<dyn HabitStore>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let retry = RetryPolicy::default();

        let habits = match retry.run(|| store.fetch_habits(&user_id)).await {
            Ok(habits) => habits,
            Err(err) => {
                tracing::warn!(%err, "loading habits failed; starting with an empty set");
                Vec::new()
            }
        };

        let rows = match retry.run(|| store.fetch_logs(&user_id)).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(%err, "loading logs failed; starting with an empty index");
                Vec::new()
            }
        };

        tracing::debug!(
            habits = habits.len(),
            rows = rows.len(),
            "tracker session loaded"
        );

        Self {
            store,
            user_id,
            habits,
            index: LogIndex::build(&rows),
            editor: None,
        }
    }

    /// Explicitly end the session, dropping the index and any open editor.
    pub fn dispose(self) {
        tracing::debug!(user_id = %self.user_id, "tracker session disposed");
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn index(&self) -> &LogIndex {
        &self.index
    }

    pub fn editor(&self) -> Option<&DayEditor> {
        self.editor.as_ref()
    }

    pub fn stats(&self, window: Window, today: DayKey) -> ProgressStats {
        aggregate::calculate_stats(&self.index, &self.habits, window, today)
    }

    pub fn habit_rate(&self, habit_id: HabitId, window: Window, today: DayKey) -> u8 {
        aggregate::habit_completion_rate(&self.index, habit_id, window, today)
    }

    pub fn monthly_series(&self, today: DayKey, months: u32) -> Vec<MonthPoint> {
        aggregate::monthly_completion_series(&self.index, &self.habits, today, months)
    }

    pub fn tips(&self, window: Window, today: DayKey) -> Vec<Tip> {
        tips::generate_tips(&self.index, &self.habits, window, today)
    }

    /// Open a day-editing session for `day`, snapshotting the current level
    /// of every tracked habit. Any prior editor is discarded, staged edits
    /// included; staging never crosses days.
    pub fn open_day(&mut self, day: DayKey) -> &DayEditor {
        let snapshot: HashMap<HabitId, Option<Level>> = self
            .habits
            .iter()
            .map(|habit| (habit.id, self.index.get(habit.id, day)))
            .collect();
        self.editor.insert(DayEditor::open(day, snapshot))
    }

    pub fn stage_level(&mut self, habit_id: HabitId, level: Level) -> TrackerResult<()> {
        self.open_editor_mut()?.set_level(habit_id, level)
    }

    pub fn stage_removal(&mut self, habit_id: HabitId) -> TrackerResult<()> {
        self.open_editor_mut()?.remove(habit_id)
    }

    /// Commit every staged entry: one upsert or delete per habit, dispatched
    /// concurrently, then wait for all of them. Each success is merged into
    /// the index and leaves the buffer; if anything failed the editor stays
    /// open with only the failed entries staged and a `PartialCommit` error
    /// reports them, so a retry resubmits just that subset.
    pub async fn save_day(&mut self) -> TrackerResult<()> {
        let (day, entries) = {
            let Some(editor) = self.editor.as_ref() else {
                return Err(TrackerError::Validation(
                    "no day-editing session is open".into(),
                ));
            };
            (editor.day(), editor.pending_entries())
        };

        if entries.is_empty() {
            self.editor = None;
            return Ok(());
        }

        let writes = entries.into_iter().map(|(habit_id, staged)| {
            let store = Arc::clone(&self.store);
            let user_id = self.user_id.clone();
            async move {
                let result = match staged {
                    Some(level) => store.upsert_log(&user_id, habit_id, day, level).await,
                    None => store.delete_log(&user_id, habit_id, day).await,
                };
                (habit_id, staged, result)
            }
        });
        let results = join_all(writes).await;

        let mut failures = Vec::new();
        for (habit_id, staged, result) in results {
            match result {
                Ok(()) => {
                    self.index.merge(habit_id, day, staged);
                    if let Some(editor) = self.editor.as_mut() {
                        editor.mark_committed(habit_id);
                    }
                }
                Err(error) => failures.push(CommitFailure { habit_id, error }),
            }
        }

        if failures.is_empty() {
            self.editor = None;
            tracing::debug!(%day, "day edits committed");
            Ok(())
        } else {
            tracing::warn!(%day, failed = failures.len(), "partial commit; failed entries stay staged");
            Err(TrackerError::PartialCommit(failures))
        }
    }

    /// Close the day editor. Dirty editors need the injected confirmation;
    /// declining keeps the editor open. Nothing has touched storage before
    /// save, so confirming simply drops the buffers.
    pub async fn cancel_day(&mut self, confirm: &dyn Confirm) -> CancelOutcome {
        let dirty = match self.editor.as_ref() {
            None => return CancelOutcome::Closed,
            Some(editor) => editor.is_dirty(),
        };

        if dirty && !confirm.confirm("Discard unsaved changes for this day?").await {
            return CancelOutcome::KeptOpen;
        }

        self.editor = None;
        CancelOutcome::Closed
    }

    fn open_editor_mut(&mut self) -> TrackerResult<&mut DayEditor> {
        self.editor.as_mut().ok_or_else(|| {
            TrackerError::Validation("no day-editing session is open".into())
        })
    }
}
