//! Persistence of monthly ledgers.

pub mod background;
pub mod file;
pub mod retry;

use std::collections::HashMap;

use tracing::info;

use crate::core::{DEFAULT_EXCHANGE_RATE, Ledger, MonthKey};

pub use background::{PendingSave, spawn_save};
pub use file::CsvLedgerStore;
pub use retry::RetryingStore;

/// Errors that can occur when reading or writing ledgers.
#[derive(Debug)]
pub enum StoreError {
    /// No ledger was ever created for the month.
    NotFound(MonthKey),
    /// The backing storage could not be read or written.
    Io(std::io::Error),
    /// Stored content could not be interpreted as a ledger.
    Corrupt(String),
    /// The ledger was built with a different exchange rate than the store uses.
    RateMismatch { ledger: f64, store: f64 },
}

impl StoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        use std::io::ErrorKind;
        match self {
            StoreError::Io(e) => matches!(
                e.kind(),
                ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(key) => write!(f, "no ledger exists for {key}"),
            StoreError::Io(e) => write!(f, "io error: {e}"),
            StoreError::Corrupt(msg) => write!(f, "corrupt ledger: {msg}"),
            StoreError::RateMismatch { ledger, store } => write!(
                f,
                "ledger exchange rate {ledger} differs from store rate {store}"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Secondary totals are recomputed from the store's rate on load, so a ledger
/// built with another rate would not read back unchanged.
pub(crate) fn check_rate(store_rate: f64, ledger: &Ledger) -> Result<(), StoreError> {
    if ledger.exchange_rate() == store_rate {
        Ok(())
    } else {
        Err(StoreError::RateMismatch {
            ledger: ledger.exchange_rate(),
            store: store_rate,
        })
    }
}

/// Abstraction over places ledgers can be kept.
pub trait LedgerStore {
    /// Returns the stored ledger for `key`, creating and persisting a zeroed
    /// one first if none exists. Existing amounts are never reset.
    fn ensure(&mut self, key: MonthKey) -> Result<Ledger, StoreError>;
    /// Reads the stored ledger for `key`.
    fn load(&self, key: MonthKey) -> Result<Ledger, StoreError>;
    /// Replaces the stored ledger for the ledger's month.
    fn save(&mut self, ledger: &Ledger) -> Result<(), StoreError>;
}

/// Store that keeps ledgers in memory only.
#[derive(Debug, Clone)]
pub struct MemoryLedgerStore {
    ledgers: HashMap<MonthKey, Ledger>,
    exchange_rate: f64,
}

impl MemoryLedgerStore {
    pub fn new(exchange_rate: f64) -> Self {
        Self {
            ledgers: HashMap::new(),
            exchange_rate,
        }
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new(DEFAULT_EXCHANGE_RATE)
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn ensure(&mut self, key: MonthKey) -> Result<Ledger, StoreError> {
        if let Some(ledger) = self.ledgers.get(&key) {
            return Ok(ledger.clone());
        }
        let ledger = Ledger::for_month(key, self.exchange_rate);
        info!(month = %key, "Created ledger");
        self.ledgers.insert(key, ledger.clone());
        Ok(ledger)
    }

    fn load(&self, key: MonthKey) -> Result<Ledger, StoreError> {
        self.ledgers
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), StoreError> {
        check_rate(self.exchange_rate, ledger)?;
        self.ledgers.insert(ledger.month(), ledger.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn load_before_ensure_is_not_found() {
        let store = MemoryLedgerStore::default();
        let key = MonthKey::new(2024, 5).unwrap();
        assert!(matches!(store.load(key), Err(StoreError::NotFound(k)) if k == key));
    }

    #[test]
    fn ensure_keeps_saved_amounts() {
        let mut store = MemoryLedgerStore::default();
        let key = MonthKey::new(2024, 5).unwrap();
        let ledger = store.ensure(key).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let out = crate::core::upsert(&ledger, date, [("Petrol", "30")]).unwrap();
        store.save(&out.ledger).unwrap();

        let again = store.ensure(key).unwrap();
        assert_eq!(again.monthly_total(), 30.0);
        assert_eq!(again, store.load(key).unwrap());
    }

    #[test]
    fn only_io_interruptions_are_retryable() {
        let timed_out = StoreError::Io(std::io::Error::from(std::io::ErrorKind::TimedOut));
        let denied = StoreError::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(timed_out.is_retryable());
        assert!(!denied.is_retryable());
        assert!(!StoreError::Corrupt("x".into()).is_retryable());
    }

    #[test]
    fn save_rejects_foreign_exchange_rate() {
        let mut store = MemoryLedgerStore::new(22.0);
        let key = MonthKey::new(2024, 5).unwrap();
        let ledger = Ledger::for_month(key, 3.0);
        let err = store.save(&ledger).unwrap_err();
        assert!(matches!(
            err,
            StoreError::RateMismatch { ledger, store } if ledger == 3.0 && store == 22.0
        ));
        assert!(matches!(store.load(key), Err(StoreError::NotFound(_))));
    }
}
