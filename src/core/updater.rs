//! Applies one day's entered amounts to a ledger and recomputes its totals.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Category, CategoryAmounts, DayRecord, Ledger, LedgerError, SummaryRecord};

/// Primary and secondary totals of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DayTotals {
    pub primary: f64,
    pub secondary: f64,
}

/// Result of [`upsert`]: the recomputed ledger and the totals of the edited day.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub ledger: Ledger,
    pub totals: DayTotals,
}

/// Parses a free-text amount. Empty, non-numeric, negative, and non-finite
/// input all yield `0.0`.
pub fn parse_amount(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        Ok(value) => {
            debug!(input = text, value, "Amount out of range, using 0");
            0.0
        }
        Err(_) => {
            debug!(input = text, "Unparseable amount, using 0");
            0.0
        }
    }
}

fn parse_inputs<I, K, V>(inputs: I) -> CategoryAmounts
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut amounts = CategoryAmounts::default();
    for (name, raw) in inputs {
        match name.as_ref().parse::<Category>() {
            Ok(category) => amounts.set(category, parse_amount(raw.as_ref())),
            Err(e) => warn!(error = %e, "Ignoring input"),
        }
    }
    amounts
}

/// Replaces the summary with fresh column sums over the ledger's days.
pub fn refresh_summary(ledger: &mut Ledger) {
    ledger.summary = Some(SummaryRecord::from_days(&ledger.days));
}

/// Records `inputs` as the amounts for `date` and returns the updated ledger.
///
/// `inputs` maps category names to the raw text entered for them. The day's
/// row is replaced as a whole, so categories missing from `inputs` become
/// zero. An existing row keeps its position. A new date is inserted in
/// calendar order rather than appended at the end, which is the same as an
/// append whenever the date sorts after every recorded day. The summary row
/// is always rebuilt from scratch.
///
/// The input ledger is left untouched.
pub fn upsert<I, K, V>(ledger: &Ledger, date: NaiveDate, inputs: I) -> Result<Upserted, LedgerError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    if !ledger.month.contains(date) {
        return Err(LedgerError::InvalidDate {
            date,
            month: ledger.month,
        });
    }

    let record = DayRecord::new(date, parse_inputs(inputs), ledger.exchange_rate);
    let totals = record.totals();

    let mut updated = ledger.clone();
    match updated.days.iter().position(|d| d.date == date) {
        Some(index) => {
            debug!(%date, index, "Replacing day");
            updated.days[index] = record;
        }
        None => {
            let index = updated.days.partition_point(|d| d.date < date);
            debug!(%date, index, "Inserting day");
            updated.days.insert(index, record);
        }
    }
    refresh_summary(&mut updated);

    Ok(Upserted {
        ledger: updated,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DEFAULT_EXCHANGE_RATE, MonthKey};

    fn feb_2024() -> Ledger {
        Ledger::for_month(MonthKey::new(2024, 2).unwrap(), DEFAULT_EXCHANGE_RATE)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn parse_amount_coerces_bad_input() {
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount("  7 "), 7.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("-3"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }

    #[test]
    fn replaces_existing_day_in_place() {
        let ledger = feb_2024();
        let out = upsert(&ledger, date(10), [("Grocery", "20")]).unwrap();
        let out = upsert(&out.ledger, date(10), [("Hotel", "5")]).unwrap();

        assert_eq!(out.ledger.days().len(), 29);
        let day = &out.ledger.days()[9];
        assert_eq!(day.date(), date(10));
        assert_eq!(day.amount(Category::Grocery), 0.0);
        assert_eq!(day.amount(Category::Hotel), 5.0);
        assert_eq!(out.totals.primary, 5.0);
    }

    #[test]
    fn inserts_missing_day_in_calendar_order() {
        let mut ledger = Ledger::new(MonthKey::new(2024, 2).unwrap(), DEFAULT_EXCHANGE_RATE);
        for d in [1, 20, 5] {
            ledger = upsert(&ledger, date(d), [("Misc", "1")]).unwrap().ledger;
        }
        let dates: Vec<_> = ledger.days().iter().map(|d| d.date()).collect();
        assert_eq!(dates, vec![date(1), date(5), date(20)]);
        assert_eq!(ledger.summary().unwrap().amount(Category::Misc), 3.0);
    }

    #[test]
    fn empty_input_still_refreshes_summary() {
        let ledger = feb_2024();
        let ledger = upsert(&ledger, date(3), [("Gas", "9")]).unwrap().ledger;
        let out = upsert(&ledger, date(3), Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(out.totals, DayTotals::default());
        assert_eq!(out.ledger.summary().unwrap().total_primary(), 0.0);
    }

    #[test]
    fn unknown_categories_are_ignored() {
        let out = upsert(&feb_2024(), date(2), [("Rent", "900"), ("bus", "4")]).unwrap();
        assert_eq!(out.totals.primary, 4.0);
    }

    #[test]
    fn rejects_date_from_another_month() {
        let ledger = feb_2024();
        let other = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = upsert(&ledger, other, [("Grocery", "1")]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDate { .. }));
    }
}
