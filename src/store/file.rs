use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, info};

use super::{LedgerStore, StoreError, check_rate};
use crate::core::{
    Category, CategoryAmounts, DEFAULT_EXCHANGE_RATE, DayRecord, Ledger, MonthKey, SUMMARY_LABEL,
    SummaryRecord, parse_amount,
};

/// Header row of every ledger file.
pub const HEADER: [&str; 15] = [
    "Date",
    "Day",
    "Grocery",
    "Hotel",
    "Laundry",
    "College",
    "Bus",
    "Dewa",
    "Gas",
    "Etisalat",
    "Elife",
    "Petrol",
    "Misc",
    "Total (Primary)",
    "Total (Secondary)",
];

const FIRST_AMOUNT: usize = 2;

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        let msg = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => StoreError::Io(io),
            _ => StoreError::Corrupt(msg),
        }
    }
}

/// Store that keeps one CSV file per month under a root directory.
#[derive(Debug, Clone)]
pub struct CsvLedgerStore {
    root: PathBuf,
    exchange_rate: f64,
}

impl CsvLedgerStore {
    /// Create a store rooted at `root` using the default exchange rate.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_exchange_rate(root, DEFAULT_EXCHANGE_RATE)
    }

    pub fn with_exchange_rate(root: impl Into<PathBuf>, exchange_rate: f64) -> Self {
        Self {
            root: root.into(),
            exchange_rate,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the file holding the ledger for `key`.
    pub fn path_for(&self, key: MonthKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    fn write_staged(&self, tmp: &Path, ledger: &Ledger) -> Result<(), StoreError> {
        let file = fs::File::create(tmp)?;
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(HEADER)?;
        for day in ledger.days() {
            wtr.write_record(day.to_row())?;
        }
        wtr.write_record(SummaryRecord::from_days(ledger.days()).to_row())?;
        let file = wtr.into_inner().map_err(|e| StoreError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    }

    fn read_days(&self, path: &Path, key: MonthKey) -> Result<Vec<DayRecord>, StoreError> {
        let mut rdr = ReaderBuilder::new().has_headers(false).from_path(path)?;
        let mut records = rdr.records();

        let header = records
            .next()
            .ok_or_else(|| StoreError::Corrupt("missing header".into()))??;
        check_header(&header)?;

        let mut seen = HashSet::new();
        let mut days = Vec::new();
        for (idx, record) in records.enumerate() {
            let record = record?;
            let label = record.get(0).unwrap_or_default().trim();
            if label == SUMMARY_LABEL {
                continue;
            }
            let date = NaiveDate::parse_from_str(label, "%Y-%m-%d")
                .map_err(|_| StoreError::Corrupt(format!("row {}: bad date {label:?}", idx + 2)))?;
            if !key.contains(date) {
                return Err(StoreError::Corrupt(format!(
                    "row {}: {date} does not belong to {key}",
                    idx + 2
                )));
            }
            if !seen.insert(date) {
                return Err(StoreError::Corrupt(format!(
                    "row {}: duplicate date {date}",
                    idx + 2
                )));
            }
            let amounts: CategoryAmounts = Category::ALL
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let cell = record.get(FIRST_AMOUNT + i).unwrap_or_default();
                    (*c, parse_amount(cell))
                })
                .collect();
            days.push(DayRecord::new(date, amounts, self.exchange_rate));
        }
        debug!(path = %path.display(), days = days.len(), "Read ledger file");
        Ok(days)
    }
}

/// Date, weekday, and category columns must match; the two total columns may
/// carry any label.
fn check_header(header: &StringRecord) -> Result<(), StoreError> {
    let fixed = HEADER.len() - 2;
    let matches = header.len() == HEADER.len()
        && header
            .iter()
            .zip(HEADER.iter())
            .take(fixed)
            .all(|(found, wanted)| found.trim() == *wanted);
    if matches {
        Ok(())
    } else {
        Err(StoreError::Corrupt(format!(
            "unexpected header: {}",
            header.iter().collect::<Vec<_>>().join(",")
        )))
    }
}

impl LedgerStore for CsvLedgerStore {
    fn ensure(&mut self, key: MonthKey) -> Result<Ledger, StoreError> {
        if self.path_for(key).exists() {
            return self.load(key);
        }
        fs::create_dir_all(&self.root)?;
        let ledger = Ledger::for_month(key, self.exchange_rate);
        self.save(&ledger)?;
        info!(month = %key, days = ledger.days().len(), "Created ledger");
        Ok(ledger)
    }

    fn load(&self, key: MonthKey) -> Result<Ledger, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(StoreError::NotFound(key));
        }
        let days = self.read_days(&path, key)?;
        Ok(Ledger::from_days(key, self.exchange_rate, days))
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), StoreError> {
        check_rate(self.exchange_rate, ledger)?;
        let path = self.path_for(ledger.month());
        let tmp = path.with_extension("csv.tmp");
        if let Err(e) = self.write_staged(&tmp, ledger) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!(path = %path.display(), total = ledger.monthly_total(), "Saved ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_accepts_currency_named_totals() {
        let mut legacy: Vec<&str> = HEADER[..13].to_vec();
        legacy.extend(["Total (AED)", "Total (INR)"]);
        assert!(check_header(&StringRecord::from(legacy)).is_ok());
    }

    #[test]
    fn header_rejects_reordered_categories() {
        let mut cols = HEADER.to_vec();
        cols.swap(2, 3);
        assert!(matches!(
            check_header(&StringRecord::from(cols)),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn path_combines_root_and_month() {
        let store = CsvLedgerStore::new("/data/expenses");
        let key = MonthKey::new(2024, 2).unwrap();
        assert_eq!(
            store.path_for(key),
            PathBuf::from("/data/expenses/2024_February.csv")
        );
    }
}
