//! Minimal civil-date arithmetic for sample dates and export file names.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86_400;

/// A proleptic Gregorian calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CalendarDate {
    /// Builds a date from its components, returning `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Date `days` after 1970-01-01 (negative values go backwards).
    pub fn from_days_since_epoch(days: i64) -> Self {
        // Howard Hinnant's civil_from_days
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
        let year = (yoe + era * 400 + i64::from(month <= 2)) as i32;
        Self { year, month, day }
    }

    pub fn days_since_epoch(&self) -> i64 {
        let year = i64::from(self.year) - i64::from(self.month <= 2);
        let era = year.div_euclid(400);
        let yoe = year.rem_euclid(400);
        let month = i64::from(self.month);
        let mp = if month > 2 { month - 3 } else { month + 9 };
        let doy = (153 * mp + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    /// The UTC date containing `time`.
    pub fn from_system_time(time: SystemTime) -> Self {
        let days = match time.duration_since(UNIX_EPOCH) {
            Ok(since) => (since.as_secs() / SECONDS_PER_DAY) as i64,
            Err(before) => -(before.duration().as_secs().div_ceil(SECONDS_PER_DAY) as i64),
        };
        Self::from_days_since_epoch(days)
    }

    pub fn today() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    pub fn minus_days(&self, days: i64) -> Self {
        Self::from_days_since_epoch(self.days_since_epoch() - days)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn epoch_is_first_of_january_1970() {
        let date = CalendarDate::from_days_since_epoch(0);
        assert_eq!(date.to_string(), "1970-01-01");
        assert_eq!(date.days_since_epoch(), 0);
    }

    #[test]
    fn known_dates_convert_both_ways() {
        let leap_day = CalendarDate::from_ymd(2024, 2, 29).unwrap();
        assert_eq!(leap_day.days_since_epoch(), 19_782);
        assert_eq!(CalendarDate::from_days_since_epoch(19_782), leap_day);

        let before_epoch = CalendarDate::from_days_since_epoch(-1);
        assert_eq!(before_epoch.to_string(), "1969-12-31");
    }

    #[test]
    fn subtracting_days_crosses_month_and_year_boundaries() {
        let new_year = CalendarDate::from_ymd(2025, 1, 3).unwrap();
        assert_eq!(new_year.minus_days(6).to_string(), "2024-12-28");

        let march = CalendarDate::from_ymd(2023, 3, 1).unwrap();
        assert_eq!(march.minus_days(1).to_string(), "2023-02-28");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(CalendarDate::from_ymd(2023, 2, 29).is_none());
        assert!(CalendarDate::from_ymd(2023, 13, 1).is_none());
        assert!(CalendarDate::from_ymd(2023, 4, 31).is_none());
    }

    #[test]
    fn system_time_maps_to_utc_day() {
        let time = UNIX_EPOCH + Duration::from_secs(19_782 * SECONDS_PER_DAY + 3_600);
        assert_eq!(CalendarDate::from_system_time(time).to_string(), "2024-02-29");
    }
}
