//! Non-collection day detection: weekends plus designated public holidays.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// 2025 public holidays in Türkiye. Religious holidays are estimates.
const HOLIDAYS_2025: &[(i32, u32, u32)] = &[
    (2025, 1, 1),
    (2025, 3, 30),
    (2025, 3, 31),
    (2025, 4, 1),
    (2025, 4, 23),
    (2025, 5, 1),
    (2025, 5, 19),
    (2025, 6, 6),
    (2025, 6, 7),
    (2025, 6, 8),
    (2025, 6, 9),
    (2025, 7, 15),
    (2025, 8, 30),
    (2025, 10, 29),
];

/// Türkiye has stayed on UTC+3 all year since 2016.
const TURKEY_UTC_OFFSET_MINUTES: i32 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayCalendar {
    pub dates: BTreeSet<NaiveDate>,
    /// Whether Saturday and Sunday count as non-collection days.
    pub weekends_off: bool,
    /// Offset of the service area's local time from UTC. Holidays and
    /// weekends are judged on the local calendar date.
    pub utc_offset_minutes: i32,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::turkey_2025()
    }
}

impl HolidayCalendar {
    /// Calendar with no designated holidays; only weekends are off.
    pub fn weekends_only() -> Self {
        Self {
            dates: BTreeSet::new(),
            weekends_off: true,
            utc_offset_minutes: 0,
        }
    }

    pub fn turkey_2025() -> Self {
        let dates = HOLIDAYS_2025
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .collect();
        Self {
            dates,
            weekends_off: true,
            utc_offset_minutes: TURKEY_UTC_OFFSET_MINUTES,
        }
    }

    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.dates.insert(date);
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Calendar date at `now` in the service area. An offset outside
    /// +/-24h is ignored.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.utc_offset_minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.date_naive(),
        }
    }

    pub fn is_non_collection_at(&self, now: DateTime<Utc>) -> bool {
        self.is_non_collection_day(self.local_date(now))
    }

    /// Waste accumulates faster on these days, so urgency gets a boost.
    pub fn is_non_collection_day(&self, date: NaiveDate) -> bool {
        if self.weekends_off && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return true;
        }
        self.dates.contains(&date)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_weekend_is_non_collection_day() {
        let calendar = HolidayCalendar::weekends_only();
        assert!(calendar.is_non_collection_day(day(2025, 11, 1))); // Saturday
        assert!(calendar.is_non_collection_day(day(2025, 11, 2))); // Sunday
        assert!(!calendar.is_non_collection_day(day(2025, 11, 3))); // Monday
    }

    #[test]
    fn test_republic_day_is_holiday() {
        let calendar = HolidayCalendar::turkey_2025();
        assert!(calendar.is_non_collection_day(day(2025, 10, 29))); // Wednesday
        assert!(!calendar.is_non_collection_day(day(2025, 10, 28)));
    }

    #[test]
    fn test_custom_holiday() {
        let calendar = HolidayCalendar::weekends_only().with_holiday(day(2026, 3, 20));
        assert!(calendar.is_non_collection_day(day(2026, 3, 20)));
    }

    #[test]
    fn test_weekends_can_be_working_days() {
        let calendar = HolidayCalendar {
            dates: BTreeSet::new(),
            weekends_off: false,
            ..HolidayCalendar::weekends_only()
        };
        assert!(!calendar.is_non_collection_day(day(2025, 11, 1)));
    }

    #[test]
    fn test_late_evening_utc_is_next_local_day() {
        // 22:00 UTC on the 28th is 01:00 on Republic Day in Bursa
        let now = Utc.with_ymd_and_hms(2025, 10, 28, 22, 0, 0).single().expect("valid timestamp");
        let turkey = HolidayCalendar::turkey_2025();
        assert_eq!(turkey.local_date(now), day(2025, 10, 29));
        assert!(turkey.is_non_collection_at(now));

        let utc = turkey.clone().with_utc_offset_minutes(0);
        assert!(!utc.is_non_collection_at(now));
    }

    #[test]
    fn test_out_of_range_offset_uses_utc_date() {
        let now = Utc.with_ymd_and_hms(2025, 10, 28, 22, 0, 0).single().expect("valid timestamp");
        let calendar = HolidayCalendar::turkey_2025().with_utc_offset_minutes(i32::MAX);
        assert_eq!(calendar.local_date(now), day(2025, 10, 28));
    }

    #[test]
    fn test_missing_offset_deserializes_to_default() {
        let calendar: HolidayCalendar =
            serde_json::from_str(r#"{"weekends_off": false}"#).expect("calendar json");
        assert_eq!(calendar.utc_offset_minutes, TURKEY_UTC_OFFSET_MINUTES);
        assert!(!calendar.weekends_off);
    }
}
