// ============================================================================
// SCHEDULE - time-of-day slot and today's day record
// ============================================================================

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::content::Day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Morning,
    Afternoon,
    Night,
}

impl Slot {
    /// [5,12) morning, [12,20) afternoon, everything else night.
    pub fn from_hour(hour: u32) -> Slot {
        match hour {
            5..=11 => Slot::Morning,
            12..=19 => Slot::Afternoon,
            _ => Slot::Night,
        }
    }

    pub fn at(now: NaiveDateTime) -> Slot {
        Slot::from_hour(now.hour())
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Afternoon => "afternoon",
            Slot::Night => "night",
        }
    }
}

/// Picks the day record to show for `today`.
///
/// Content files are generated per month and may not line up with the
/// calendar, so the lookup falls back in a fixed order: exact date, then
/// the same day-of-month, then the last record. Empty input yields `None`.
pub fn select_day(days: &[Day], today: NaiveDate) -> Option<&Day> {
    let today_str = today.format("%Y-%m-%d").to_string();

    if let Some(exact) = days.iter().find(|d| d.date == today_str) {
        return Some(exact);
    }

    let day_of_month = today.day();
    if let Some(by_day) = days.iter().find(|d| d.day == day_of_month) {
        return Some(by_day);
    }

    days.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::day;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slot_boundaries() {
        assert_eq!(Slot::from_hour(4), Slot::Night);
        assert_eq!(Slot::from_hour(5), Slot::Morning);
        assert_eq!(Slot::from_hour(11), Slot::Morning);
        assert_eq!(Slot::from_hour(12), Slot::Afternoon);
        assert_eq!(Slot::from_hour(19), Slot::Afternoon);
        assert_eq!(Slot::from_hour(20), Slot::Night);
        assert_eq!(Slot::from_hour(0), Slot::Night);
    }

    #[test]
    fn exact_date_wins_over_day_of_month() {
        let days = vec![
            day("2026-09-17", 17, "Burnout"),
            day("2026-10-17", 17, "Financial Knowledge"),
        ];
        let picked = select_day(&days, date(2026, 10, 17)).unwrap();
        assert_eq!(picked.date, "2026-10-17");
    }

    #[test]
    fn falls_back_to_day_of_month() {
        let days = vec![
            day("2026-11-16", 16, "Burnout"),
            day("2026-11-17", 17, "Burnout"),
            day("2026-11-18", 18, "Burnout"),
        ];
        let picked = select_day(&days, date(2026, 10, 17)).unwrap();
        assert_eq!(picked.date, "2026-11-17");
    }

    #[test]
    fn falls_back_to_last_record() {
        let days = vec![day("2026-02-01", 1, "Burnout"), day("2026-02-28", 28, "Burnout")];
        let picked = select_day(&days, date(2026, 10, 31)).unwrap();
        assert_eq!(picked.date, "2026-02-28");
    }

    #[test]
    fn empty_list_has_no_day() {
        assert!(select_day(&[], date(2026, 10, 17)).is_none());
    }
}
