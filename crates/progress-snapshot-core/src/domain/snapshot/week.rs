//! Week-ending date policy
//!
//! A snapshot is keyed by the most recent week-end weekday on or before the run date.
//! Running on the week-end day itself keys the snapshot by that same day, so a job that
//! only fires on Sundays and one that fires daily agree on the key.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::config::SnapshotSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekEndPolicy {
    week_end_day: Weekday,
}

impl Default for WeekEndPolicy {
    fn default() -> Self {
        Self::new(Weekday::Sun)
    }
}

impl WeekEndPolicy {
    pub fn new(week_end_day: Weekday) -> Self {
        Self { week_end_day }
    }

    pub fn from_settings(settings: &SnapshotSettings) -> Self {
        Self::new(settings.week_end_day)
    }

    pub fn week_end_day(&self) -> Weekday {
        self.week_end_day
    }

    pub fn is_week_end_day(&self, date: NaiveDate) -> bool {
        date.weekday() == self.week_end_day
    }

    /// Week-ending date that `run_date` reports into
    pub fn week_ending(&self, run_date: NaiveDate) -> NaiveDate {
        let back = (7 + run_date.weekday().num_days_from_monday()
            - self.week_end_day.num_days_from_monday())
            % 7;
        run_date - Duration::days(i64::from(back))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sunday_maps_to_itself() {
        let policy = WeekEndPolicy::default();
        // 2024-06-02 is a Sunday
        assert_eq!(policy.week_ending(date(2024, 6, 2)), date(2024, 6, 2));
        assert!(policy.is_week_end_day(date(2024, 6, 2)));
    }

    #[test]
    fn test_midweek_maps_to_previous_sunday() {
        let policy = WeekEndPolicy::default();
        assert_eq!(policy.week_ending(date(2024, 6, 3)), date(2024, 6, 2));
        assert_eq!(policy.week_ending(date(2024, 6, 5)), date(2024, 6, 2));
        assert_eq!(policy.week_ending(date(2024, 6, 8)), date(2024, 6, 2));
        assert!(!policy.is_week_end_day(date(2024, 6, 8)));
    }

    #[test]
    fn test_crosses_month_boundary() {
        let policy = WeekEndPolicy::default();
        // Saturday 2024-03-02 belongs to the week ending Sunday 2024-02-25
        assert_eq!(policy.week_ending(date(2024, 3, 2)), date(2024, 2, 25));
    }

    #[test]
    fn test_custom_week_end_day() {
        let policy = WeekEndPolicy::new(Weekday::Fri);
        // 2024-06-07 is a Friday
        assert_eq!(policy.week_ending(date(2024, 6, 7)), date(2024, 6, 7));
        assert_eq!(policy.week_ending(date(2024, 6, 6)), date(2024, 5, 31));
        assert_eq!(policy.week_ending(date(2024, 6, 9)), date(2024, 6, 7));
    }
}
