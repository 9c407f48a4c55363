//! Canonical calendar-day key used to join log rows and calendar cells.
//!
//! A `DayKey` is a plain local-calendar date rendered as `YYYY-MM-DD`. The
//! same truncation is applied when indexing fetched rows and when committing
//! edits; any divergence between the two paths would silently drop logs from
//! view, so both go through this type.

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Today's key in the local calendar.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Drop the time-of-day component of a local moment. Stable for every
    /// moment within the same local calendar day; no UTC conversion.
    pub fn from_local(moment: DateTime<Local>) -> Self {
        Self(moment.date_naive())
    }

    /// Parse a `YYYY-MM-DD` key.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Self)
    }

    /// The Unix epoch day, used as the open end of the `all` window.
    pub fn epoch() -> Self {
        Self(NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch is a valid date"))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The previous calendar day, `None` only at the edge of the calendar.
    pub fn pred(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn minus_days(self, n: u64) -> Self {
        self.0
            .checked_sub_days(Days::new(n))
            .map(Self)
            .unwrap_or_else(Self::epoch)
    }

    /// Calendar-month subtraction, clamped to the end of the target month
    /// (Mar 31 minus one month is Feb 28/29).
    pub fn minus_months(self, n: u32) -> Self {
        self.0
            .checked_sub_months(Months::new(n))
            .map(Self)
            .unwrap_or_else(Self::epoch)
    }

    /// Whole days from `earlier` to `self`; negative if `earlier` is later.
    pub fn days_since(&self, earlier: DayKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    pub fn first_of_month(self) -> Self {
        Self(NaiveDate::from_ymd_opt(self.0.year(), self.0.month(), 1).expect("day 1 always exists"))
    }

    pub fn last_of_month(self) -> Self {
        self.first_of_month()
            .0
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .map(Self)
            .unwrap_or(self)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        let raw = String::deserialize(deserializer)?;
        DayKey::parse(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected YYYY-MM-DD day key, got {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(s: &str) -> DayKey {
        DayKey::parse(s).expect("valid key")
    }

    #[test]
    fn stable_across_time_of_day() {
        let morning = Local.with_ymd_and_hms(2024, 6, 15, 0, 5, 0).unwrap();
        let night = Local.with_ymd_and_hms(2024, 6, 15, 23, 55, 0).unwrap();
        assert_eq!(DayKey::from_local(morning), DayKey::from_local(night));
        assert_eq!(DayKey::from_local(morning).to_string(), "2024-06-15");
    }

    #[test]
    fn parse_display_round_trip() {
        let k = key("2024-01-04");
        assert_eq!(k.to_string(), "2024-01-04");
        assert_eq!(k.date(), NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert!(DayKey::parse("not-a-date").is_none());
        assert!(DayKey::parse("2024-02-30").is_none());
    }

    #[test]
    fn serde_uses_string_form() {
        let k = key("2024-03-05");
        assert_eq!(serde_json::to_string(&k).unwrap(), "\"2024-03-05\"");
        let back: DayKey = serde_json::from_str("\"2024-03-05\"").unwrap();
        assert_eq!(back, k);
        let bad: Result<DayKey, _> = serde_json::from_str("\"05/03/2024\"");
        assert!(bad.is_err());
    }

    #[test]
    fn month_subtraction_clamps_at_month_end() {
        assert_eq!(key("2024-03-31").minus_months(1), key("2024-02-29"));
        assert_eq!(key("2023-03-31").minus_months(1), key("2023-02-28"));
        assert_eq!(key("2024-05-31").minus_months(3), key("2024-02-29"));
        assert_eq!(key("2024-02-29").minus_months(12), key("2023-02-28"));
    }

    #[test]
    fn day_arithmetic() {
        assert_eq!(key("2024-01-08").minus_days(7), key("2024-01-01"));
        assert_eq!(key("2024-01-08").days_since(key("2024-01-01")), 7);
        assert_eq!(key("2024-03-01").pred(), Some(key("2024-02-29")));
    }

    #[test]
    fn month_bounds() {
        assert_eq!(key("2024-02-10").first_of_month(), key("2024-02-01"));
        assert_eq!(key("2024-02-10").last_of_month(), key("2024-02-29"));
        assert_eq!(key("2024-12-31").last_of_month(), key("2024-12-31"));
    }
}
