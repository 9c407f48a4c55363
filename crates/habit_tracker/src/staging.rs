//! Day-level edit staging.
//!
//! Edits made inside the day modal are buffered here and only reach the
//! store on an explicit save. Each editor is bound to exactly one calendar
//! day; opening another day replaces the whole editor, so staged changes can
//! never leak across days.

use crate::error::{TrackerError, TrackerResult};
use async_trait::async_trait;
use habit_store_client::{DayKey, HabitId, Level};
use std::collections::HashMap;

/// Yes/no decision capability used by cancel-with-confirmation, injected so
/// the staging flow is testable without a real dialog.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Closed,
    KeptOpen,
}

/// Staged edits for a single calendar day.
///
/// `original` snapshots the level of every tracked habit at open time (used
/// to restore the visual state on cancel); `pending` holds the uncommitted
/// changes, with `None` meaning "remove the log for this day".
#[derive(Debug)]
pub struct DayEditor {
    day: DayKey,
    original: HashMap<HabitId, Option<Level>>,
    pending: HashMap<HabitId, Option<Level>>,
}

impl DayEditor {
    pub(crate) fn open(day: DayKey, snapshot: HashMap<HabitId, Option<Level>>) -> Self {
        Self {
            day,
            original: snapshot,
            pending: HashMap::new(),
        }
    }

    pub fn day(&self) -> DayKey {
        self.day
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn set_level(&mut self, habit_id: HabitId, level: Level) -> TrackerResult<()> {
        self.check_tracked(habit_id)?;
        self.pending.insert(habit_id, Some(level));
        Ok(())
    }

    pub fn remove(&mut self, habit_id: HabitId) -> TrackerResult<()> {
        self.check_tracked(habit_id)?;
        self.pending.insert(habit_id, None);
        Ok(())
    }

    /// The level the day cell should currently show: the staged value when
    /// one exists, the opening snapshot otherwise.
    pub fn staged_level(&self, habit_id: HabitId) -> Option<Level> {
        match self.pending.get(&habit_id) {
            Some(staged) => *staged,
            None => self.original.get(&habit_id).copied().flatten(),
        }
    }

    pub fn original_level(&self, habit_id: HabitId) -> Option<Level> {
        self.original.get(&habit_id).copied().flatten()
    }

    /// The entries still awaiting commit, `None` marking removals.
    pub fn pending_entries(&self) -> Vec<(HabitId, Option<Level>)> {
        self.pending.iter().map(|(id, level)| (*id, *level)).collect()
    }

    pub(crate) fn mark_committed(&mut self, habit_id: HabitId) {
        self.pending.remove(&habit_id);
    }

    fn check_tracked(&self, habit_id: HabitId) -> TrackerResult<()> {
        if self.original.contains_key(&habit_id) {
            Ok(())
        } else {
            Err(TrackerError::Validation(format!(
                "habit {habit_id} is not in the tracked set for this session"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).expect("valid key")
    }

    fn editor() -> DayEditor {
        let snapshot = HashMap::from([(1, Some(Level::Basic)), (2, None)]);
        DayEditor::open(day("2024-02-10"), snapshot)
    }

    #[test]
    fn opens_clean_with_the_snapshot_visible() {
        let editor = editor();
        assert!(!editor.is_dirty());
        assert_eq!(editor.staged_level(1), Some(Level::Basic));
        assert_eq!(editor.staged_level(2), None);
    }

    #[test]
    fn staged_values_shadow_the_snapshot() {
        let mut editor = editor();
        editor.set_level(1, Level::Advanced).unwrap();
        editor.remove(2).unwrap();
        assert!(editor.is_dirty());
        assert_eq!(editor.staged_level(1), Some(Level::Advanced));
        assert_eq!(editor.staged_level(2), None);
        assert_eq!(editor.original_level(1), Some(Level::Basic));
    }

    #[test]
    fn staging_an_untracked_habit_is_rejected() {
        let mut editor = editor();
        assert!(matches!(
            editor.set_level(99, Level::Basic),
            Err(TrackerError::Validation(_))
        ));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn committed_entries_leave_the_buffer() {
        let mut editor = editor();
        editor.set_level(1, Level::Advanced).unwrap();
        editor.remove(2).unwrap();
        editor.mark_committed(1);
        assert_eq!(editor.pending_entries(), vec![(2, None)]);
        assert!(editor.is_dirty());
    }
}
