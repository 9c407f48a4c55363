//! Shared in-memory `HabitStore` used by unit tests, with per-habit write
//! failure injection for exercising partial commits.
#![cfg(test)]

use async_trait::async_trait;
use habit_store_client::{DayKey, Habit, HabitId, HabitLog, HabitStore, Level, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub struct MemoryStore {
    habits: Vec<Habit>,
    rows: Mutex<HashMap<(HabitId, DayKey), Level>>,
    failing_writes: Mutex<HashSet<HabitId>>,
    fail_fetches: bool,
}

impl MemoryStore {
    pub fn new(habits: Vec<Habit>, seed: &[HabitLog]) -> Self {
        let rows = seed
            .iter()
            .map(|row| ((row.habit_id, row.day), row.level))
            .collect();
        Self {
            habits,
            rows: Mutex::new(rows),
            failing_writes: Mutex::new(HashSet::new()),
            fail_fetches: false,
        }
    }

    /// A store whose fetches always fail, for degraded-load tests.
    pub fn unreachable() -> Self {
        Self {
            habits: Vec::new(),
            rows: Mutex::new(HashMap::new()),
            failing_writes: Mutex::new(HashSet::new()),
            fail_fetches: true,
        }
    }

    pub fn fail_writes_for(&self, habit_id: HabitId) {
        self.failing_writes.lock().unwrap().insert(habit_id);
    }

    pub fn heal(&self) {
        self.failing_writes.lock().unwrap().clear();
    }

    pub fn level(&self, habit_id: HabitId, day: DayKey) -> Option<Level> {
        self.rows.lock().unwrap().get(&(habit_id, day)).copied()
    }

    fn check_writable(&self, habit_id: HabitId) -> Result<(), StoreError> {
        if self.failing_writes.lock().unwrap().contains(&habit_id) {
            Err(StoreError::Config("injected write failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn fetch_habits(&self, _user_id: &str) -> Result<Vec<Habit>, StoreError> {
        if self.fail_fetches {
            return Err(StoreError::Config("injected fetch failure".into()));
        }
        Ok(self.habits.clone())
    }

    async fn fetch_logs(&self, _user_id: &str) -> Result<Vec<HabitLog>, StoreError> {
        if self.fail_fetches {
            return Err(StoreError::Config("injected fetch failure".into()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|((habit_id, day), level)| HabitLog {
                habit_id: *habit_id,
                day: *day,
                level: *level,
            })
            .collect())
    }

    async fn upsert_log(
        &self,
        _user_id: &str,
        habit_id: HabitId,
        day: DayKey,
        level: Level,
    ) -> Result<(), StoreError> {
        self.check_writable(habit_id)?;
        self.rows.lock().unwrap().insert((habit_id, day), level);
        Ok(())
    }

    async fn delete_log(
        &self,
        _user_id: &str,
        habit_id: HabitId,
        day: DayKey,
    ) -> Result<(), StoreError> {
        self.check_writable(habit_id)?;
        self.rows.lock().unwrap().remove(&(habit_id, day));
        Ok(())
    }
}
