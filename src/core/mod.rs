//! Core data model for monthly expense ledgers.

use chrono::NaiveDate;
use serde::Serialize;

pub mod category;
pub mod month;
pub mod updater;

pub use category::{Category, CategoryAmounts, UnknownCategory};
pub use month::MonthKey;
pub use updater::{DayTotals, Upserted, parse_amount, refresh_summary, upsert};

/// Static multiplier from the primary to the secondary display currency.
pub const DEFAULT_EXCHANGE_RATE: f64 = 22.0;

/// Value of the date column on the summary row.
pub const SUMMARY_LABEL: &str = "TOTAL";

/// Value of the weekday column on the summary row.
pub const SUMMARY_WEEKDAY: &str = "-";

/// Errors raised by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The year or month does not name a calendar month.
    InvalidMonth { year: i32, month: u32 },
    /// A day was addressed to a ledger for a different month.
    InvalidDate { date: NaiveDate, month: MonthKey },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::InvalidMonth { year, month } => {
                write!(f, "invalid month: {year}-{month:02}")
            }
            LedgerError::InvalidDate { date, month } => {
                write!(f, "date {date} is outside the ledger for {month}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}

fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

/// One calendar day's expenses. Weekday and totals are derived from the date,
/// the category amounts, and the exchange rate whenever the record is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    date: NaiveDate,
    weekday: String,
    categories: CategoryAmounts,
    total_primary: f64,
    total_secondary: f64,
}

impl DayRecord {
    pub fn new(date: NaiveDate, categories: CategoryAmounts, exchange_rate: f64) -> Self {
        let total_primary = categories.total();
        Self {
            date,
            weekday: date.format("%A").to_string(),
            categories,
            total_primary,
            total_secondary: total_primary * exchange_rate,
        }
    }

    /// A record with every category at zero.
    pub fn zeroed(date: NaiveDate, exchange_rate: f64) -> Self {
        Self::new(date, CategoryAmounts::default(), exchange_rate)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Full English weekday name, e.g. `Thursday`.
    pub fn weekday(&self) -> &str {
        &self.weekday
    }

    pub fn categories(&self) -> &CategoryAmounts {
        &self.categories
    }

    pub fn amount(&self, category: Category) -> f64 {
        self.categories.get(category)
    }

    pub fn total_primary(&self) -> f64 {
        self.total_primary
    }

    pub fn total_secondary(&self) -> f64 {
        self.total_secondary
    }

    pub fn totals(&self) -> DayTotals {
        DayTotals {
            primary: self.total_primary,
            secondary: self.total_secondary,
        }
    }

    /// Converts the record into a ledger row.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![self.date.format("%Y-%m-%d").to_string(), self.weekday.clone()];
        row.extend(self.categories.iter().map(|(_, a)| format_amount(a)));
        row.push(format_amount(self.total_primary));
        row.push(format_amount(self.total_secondary));
        row
    }
}

/// Column sums over every [`DayRecord`] of a ledger.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryRecord {
    categories: CategoryAmounts,
    total_primary: f64,
    total_secondary: f64,
}

impl SummaryRecord {
    /// Sums each column over `days`.
    pub fn from_days<'a>(days: impl IntoIterator<Item = &'a DayRecord>) -> Self {
        days.into_iter().fold(Self::default(), |mut acc, day| {
            acc.categories.accumulate(&day.categories);
            acc.total_primary += day.total_primary;
            acc.total_secondary += day.total_secondary;
            acc
        })
    }

    pub fn categories(&self) -> &CategoryAmounts {
        &self.categories
    }

    pub fn amount(&self, category: Category) -> f64 {
        self.categories.get(category)
    }

    pub fn total_primary(&self) -> f64 {
        self.total_primary
    }

    pub fn total_secondary(&self) -> f64 {
        self.total_secondary
    }

    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![SUMMARY_LABEL.to_string(), SUMMARY_WEEKDAY.to_string()];
        row.extend(self.categories.iter().map(|(_, a)| format_amount(a)));
        row.push(format_amount(self.total_primary));
        row.push(format_amount(self.total_secondary));
        row
    }
}

/// All day records of one month plus the trailing summary row.
///
/// Days are kept in calendar order and each date appears at most once. The
/// summary, when present, always follows the last day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    month: MonthKey,
    exchange_rate: f64,
    days: Vec<DayRecord>,
    summary: Option<SummaryRecord>,
}

impl Ledger {
    /// An empty ledger with no days and no summary.
    pub fn new(month: MonthKey, exchange_rate: f64) -> Self {
        Self {
            month,
            exchange_rate,
            days: Vec::new(),
            summary: None,
        }
    }

    /// A ledger with one zeroed record per calendar day and a fresh summary.
    pub fn for_month(month: MonthKey, exchange_rate: f64) -> Self {
        let days = month
            .days()
            .map(|date| DayRecord::zeroed(date, exchange_rate))
            .collect();
        let mut ledger = Self {
            month,
            exchange_rate,
            days,
            summary: None,
        };
        refresh_summary(&mut ledger);
        ledger
    }

    /// Builds a ledger from already validated records, sorting them by date
    /// and recomputing the summary.
    pub(crate) fn from_days(month: MonthKey, exchange_rate: f64, mut days: Vec<DayRecord>) -> Self {
        days.sort_by_key(|d| d.date);
        let mut ledger = Self {
            month,
            exchange_rate,
            days,
            summary: None,
        };
        refresh_summary(&mut ledger);
        ledger
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn summary(&self) -> Option<&SummaryRecord> {
        self.summary.as_ref()
    }

    /// The record for `date`, if the ledger has one.
    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Sum of the primary totals of every day.
    pub fn monthly_total(&self) -> f64 {
        self.days.iter().map(|d| d.total_primary).sum()
    }

    /// Sum of the secondary totals of every day.
    pub fn monthly_total_secondary(&self) -> f64 {
        self.days.iter().map(|d| d.total_secondary).sum()
    }

    /// `(date, primary total)` for each day, in calendar order.
    pub fn daily_totals(&self) -> Vec<(NaiveDate, f64)> {
        self.days.iter().map(|d| (d.date, d.total_primary)).collect()
    }

    /// Day rows followed by the summary row, if any.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = self.days.iter().map(DayRecord::to_row).collect();
        if let Some(summary) = &self.summary {
            rows.push(summary.to_row());
        }
        rows
    }
}
