use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

use super::LedgerError;

/// A validated (year, month) pair. Each key names exactly one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// Creates a key for a four-digit year and a month in `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(0..=9999).contains(&year) {
            return Err(LedgerError::InvalidMonth { year, month });
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(LedgerError::InvalidMonth { year, month })
    }

    /// The key of the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Full English month name, e.g. `February`.
    pub fn month_name(&self) -> String {
        self.first.format("%B").to_string()
    }

    /// Every calendar day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let (year, month) = (self.year(), self.month());
        (1..=31).map_while(move |day| NaiveDate::from_ymd_opt(year, month, day))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// File name of the ledger for this month, e.g. `2024_February.csv`.
    pub fn file_name(&self) -> String {
        format!("{:04}_{}.csv", self.year(), self.month_name())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year())
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:04}-{:02}", self.year(), self.month()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_months() {
        assert!(MonthKey::new(2024, 0).is_err());
        assert!(MonthKey::new(2024, 13).is_err());
        assert!(MonthKey::new(10_000, 1).is_err());
    }

    #[test]
    fn day_counts_follow_calendar() {
        let count = |y, m| MonthKey::new(y, m).unwrap().days().count();
        assert_eq!(count(2024, 2), 29);
        assert_eq!(count(2023, 2), 28);
        assert_eq!(count(1900, 2), 28);
        assert_eq!(count(2000, 2), 29);
        assert_eq!(count(2024, 4), 30);
        assert_eq!(count(2024, 12), 31);
    }

    #[test]
    fn file_name_uses_year_and_month_name() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert_eq!(key.file_name(), "2025_March.csv");
        assert_eq!(key.to_string(), "March 2025");
    }

    #[test]
    fn of_truncates_to_first_day() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 19).unwrap();
        let key = MonthKey::of(date);
        assert_eq!(key, MonthKey::new(2024, 7).unwrap());
        assert!(key.contains(date));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()));
    }
}
