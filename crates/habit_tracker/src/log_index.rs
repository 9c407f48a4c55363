//! In-memory index of log rows: habit → day → level.
//!
//! Rebuilt wholesale from the fetched row list once per session, then kept
//! consistent with backing storage through [`LogIndex::merge`] after each
//! successful commit. Never persisted.

use habit_store_client::{DayKey, HabitId, HabitLog, Level};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Default)]
pub struct LogIndex {
    by_habit: HashMap<HabitId, BTreeMap<DayKey, Level>>,
}

impl LogIndex {
    /// Group rows by habit then day. If the backing store ever hands us two
    /// rows for the same key (it should not, given the upsert invariant),
    /// the later row wins.
    pub fn build(rows: &[HabitLog]) -> Self {
        let mut by_habit: HashMap<HabitId, BTreeMap<DayKey, Level>> = HashMap::new();
        for row in rows {
            by_habit.entry(row.habit_id).or_default().insert(row.day, row.level);
        }
        Self { by_habit }
    }

    pub fn get(&self, habit_id: HabitId, day: DayKey) -> Option<Level> {
        self.by_habit.get(&habit_id).and_then(|days| days.get(&day)).copied()
    }

    /// Set or remove a single entry. `None` removes; removing the last entry
    /// for a habit drops its inner map.
    pub fn merge(&mut self, habit_id: HabitId, day: DayKey, level: Option<Level>) {
        match level {
            Some(level) => {
                self.by_habit.entry(habit_id).or_default().insert(day, level);
            }
            None => {
                if let Some(days) = self.by_habit.get_mut(&habit_id) {
                    days.remove(&day);
                    if days.is_empty() {
                        self.by_habit.remove(&habit_id);
                    }
                }
            }
        }
    }

    /// Number of logged days for `habit_id` within `[start, end]` inclusive.
    pub fn logged_days_in(&self, habit_id: HabitId, start: DayKey, end: DayKey) -> usize {
        self.by_habit
            .get(&habit_id)
            .map(|days| days.range(start..=end).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.by_habit.is_empty()
    }
}
