//! Date-windowed aggregation over the log index: completion rates, streaks,
//! perfect days, and the trailing monthly series.

use crate::TrackerError;
use crate::log_index::LogIndex;
use habit_store_client::{DayKey, Habit, HabitId, Level};
use serde::Serialize;
use std::str::FromStr;

/// Named reporting window ending at the reference day.
///
/// Month, quarter and year subtract calendar months, so window lengths vary
/// with actual month lengths. That matches the reported numbers users have
/// always seen; do not "fix" it to uniform day counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl Window {
    pub fn start(self, today: DayKey) -> DayKey {
        match self {
            Window::Week => today.minus_days(7),
            Window::Month => today.minus_months(1),
            Window::Quarter => today.minus_months(3),
            Window::Year => today.minus_months(12),
            Window::All => DayKey::epoch(),
        }
    }

    /// Whole days between the window start and `today`. This is the rate
    /// denominator even though day counting is inclusive on both ends; the
    /// clamp to 100 absorbs the off-by-one, preserving historical numbers.
    pub fn span_days(self, today: DayKey) -> u64 {
        today.days_since(self.start(today)).max(0) as u64
    }
}

impl FromStr for Window {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Window::Week),
            "month" => Ok(Window::Month),
            "quarter" => Ok(Window::Quarter),
            "year" => Ok(Window::Year),
            "all" => Ok(Window::All),
            other => Err(TrackerError::Validation(format!("unknown window: {other:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    /// Aggregate completion percentage across all habits, 0-100.
    pub completion_rate: u8,
    /// Consecutive logged days ending at the reference day.
    pub current_streak: u32,
    /// Longest consecutive run of logged days inside the window.
    pub longest_streak: u32,
    /// Days on which every tracked habit was logged at the highest level.
    pub perfect_days: u32,
    /// Habits with at least one log inside the window.
    pub completed_habits: u32,
}

/// One month of the trailing completion series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    pub year: i32,
    pub month: u32,
    pub completion_rate: u8,
}

fn percentage(numerator: u64, denominator: u64) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let raw = (numerator as f64 / denominator as f64 * 100.0).round();
    raw.clamp(0.0, 100.0) as u8
}

/// Completion rate for a single habit over the window: logged days inside
/// `[start, today]` over the window span, rounded to whole percent.
pub fn habit_completion_rate(
    index: &LogIndex,
    habit_id: HabitId,
    window: Window,
    today: DayKey,
) -> u8 {
    let start = window.start(today);
    let completed = index.logged_days_in(habit_id, start, today) as u64;
    percentage(completed, window.span_days(today))
}

/// Aggregate statistics for the whole habit set over the window.
///
/// The streak walk runs backward from `today` to the window start, both
/// inclusive. A day extends a streak when any habit has a log; the first
/// silent day ends the current streak.
pub fn calculate_stats(
    index: &LogIndex,
    habits: &[Habit],
    window: Window,
    today: DayKey,
) -> ProgressStats {
    let start = window.start(today);

    let mut logged_habit_days = 0u64;
    let mut completed_habits = 0u32;
    for habit in habits {
        let days = index.logged_days_in(habit.id, start, today) as u64;
        logged_habit_days += days;
        if days > 0 {
            completed_habits += 1;
        }
    }

    let mut current_streak = 0u32;
    let mut longest_streak = 0u32;
    let mut run = 0u32;
    let mut perfect_days = 0u32;
    let mut gap_seen = false;

    let mut cursor = Some(today);
    while let Some(day) = cursor {
        if day < start {
            break;
        }
        let active = habits.iter().any(|h| index.get(h.id, day).is_some());
        if active {
            run += 1;
            longest_streak = longest_streak.max(run);
            if !gap_seen {
                current_streak += 1;
            }
            if !habits.is_empty()
                && habits.iter().all(|h| index.get(h.id, day) == Some(Level::highest()))
            {
                perfect_days += 1;
            }
        } else {
            run = 0;
            gap_seen = true;
        }
        cursor = day.pred();
    }

    let denominator = window.span_days(today) * habits.len() as u64;
    ProgressStats {
        completion_rate: percentage(logged_habit_days, denominator),
        current_streak,
        longest_streak,
        perfect_days,
        completed_habits,
    }
}

/// Aggregate completion rate for each of the trailing `months` calendar
/// months (oldest first). Each month is scored over its full length, the
/// current month included.
pub fn monthly_completion_series(
    index: &LogIndex,
    habits: &[Habit],
    today: DayKey,
    months: u32,
) -> Vec<MonthPoint> {
    let mut series = Vec::with_capacity(months as usize);
    for back in (0..months).rev() {
        let anchor = today.minus_months(back);
        let first = anchor.first_of_month();
        let last = anchor.last_of_month();
        let days_in_month = (last.days_since(first) + 1) as u64;

        let logged: u64 = habits
            .iter()
            .map(|h| index.logged_days_in(h.id, first, last) as u64)
            .sum();

        series.push(MonthPoint {
            year: anchor.year(),
            month: anchor.month(),
            completion_rate: percentage(logged, days_in_month * habits.len() as u64),
        });
    }
    series
}
