//! Rule-based feedback derived from aggregation outputs.

use crate::aggregate::{self, Window};
use crate::log_index::LogIndex;
use habit_store_client::{DayKey, Habit};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TipKind {
    /// No habits tracked at all.
    GettingStarted,
    /// Nothing logged for this habit in the trailing seven days.
    Inactive,
    /// Window completion rate below 30%.
    LowRate(u8),
    /// Window completion rate at or above 70%.
    HighRate(u8),
    /// Current streak shorter than three days.
    ShortStreak,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tip {
    /// Habit name for per-habit tips, `None` for general ones.
    pub habit: Option<String>,
    pub kind: TipKind,
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.habit.as_deref().unwrap_or("");
        match &self.kind {
            TipKind::GettingStarted => {
                write!(f, "Start by adding habits to track your progress!")
            }
            TipKind::Inactive => write!(
                f,
                "\"{name}\" has no logs in the last week. Try starting small!"
            ),
            TipKind::LowRate(rate) => write!(
                f,
                "\"{name}\" completion is low ({rate}%). Try pinning it to a fixed time of day!"
            ),
            TipKind::HighRate(rate) => write!(
                f,
                "\"{name}\" is going great at {rate}% completion. Keep it up!"
            ),
            TipKind::ShortStreak => write!(
                f,
                "Try to keep a streak of at least 3 consecutive days to make a habit stick!"
            ),
        }
    }
}

/// Per-habit tips over the trailing seven days and the active window, plus
/// one general nudge when the current streak is short. Habits in the 30-70%
/// band get no message; that middle ground is intentionally quiet.
pub fn generate_tips(
    index: &LogIndex,
    habits: &[Habit],
    window: Window,
    today: DayKey,
) -> Vec<Tip> {
    if habits.is_empty() {
        return vec![Tip {
            habit: None,
            kind: TipKind::GettingStarted,
        }];
    }

    let week_start = today.minus_days(7);
    let mut tips = Vec::new();

    for habit in habits {
        let recent = index.logged_days_in(habit.id, week_start, today);
        let rate = aggregate::habit_completion_rate(index, habit.id, window, today);

        let kind = if recent == 0 {
            Some(TipKind::Inactive)
        } else if rate < 30 {
            Some(TipKind::LowRate(rate))
        } else if rate >= 70 {
            Some(TipKind::HighRate(rate))
        } else {
            None
        };
        if let Some(kind) = kind {
            tips.push(Tip {
                habit: Some(habit.name.clone()),
                kind,
            });
        }
    }

    let stats = aggregate::calculate_stats(index, habits, window, today);
    if stats.current_streak < 3 {
        tips.push(Tip {
            habit: None,
            kind: TipKind::ShortStreak,
        });
    }

    tips
}
