use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use home_expense::core::{Ledger, MonthKey};
use home_expense::store::{LedgerStore, MemoryLedgerStore, RetryingStore, StoreError};

struct FlakyStore {
    fail_times: usize,
    calls: Rc<RefCell<usize>>,
    kind: std::io::ErrorKind,
    inner: MemoryLedgerStore,
}

impl FlakyStore {
    fn new(fail_times: usize, calls: Rc<RefCell<usize>>, kind: std::io::ErrorKind) -> Self {
        Self {
            fail_times,
            calls,
            kind,
            inner: MemoryLedgerStore::default(),
        }
    }
}

impl LedgerStore for FlakyStore {
    fn ensure(&mut self, key: MonthKey) -> Result<Ledger, StoreError> {
        self.inner.ensure(key)
    }

    fn load(&self, key: MonthKey) -> Result<Ledger, StoreError> {
        self.inner.load(key)
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), StoreError> {
        let mut c = self.calls.borrow_mut();
        *c += 1;
        if *c <= self.fail_times {
            Err(StoreError::Io(std::io::Error::from(self.kind)))
        } else {
            self.inner.save(ledger)
        }
    }
}

fn ledger() -> Ledger {
    Ledger::for_month(MonthKey::new(2024, 2).unwrap(), 22.0)
}

#[test]
fn retries_and_succeeds() {
    let calls = Rc::new(RefCell::new(0));
    let store = FlakyStore::new(2, Rc::clone(&calls), std::io::ErrorKind::Interrupted);
    let mut retry = RetryingStore::new(store, 3, Duration::from_millis(1));
    retry.save(&ledger()).unwrap();
    assert_eq!(*calls.borrow(), 3);
    assert_eq!(retry.load(ledger().month()).unwrap(), ledger());
}

#[test]
fn gives_up_after_max_retries() {
    let calls = Rc::new(RefCell::new(0));
    let store = FlakyStore::new(5, Rc::clone(&calls), std::io::ErrorKind::TimedOut);
    let mut retry = RetryingStore::new(store, 3, Duration::from_millis(1));
    let err = retry.save(&ledger()).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert_eq!(*calls.borrow(), 4);
}

#[test]
fn permanent_errors_are_not_retried() {
    let calls = Rc::new(RefCell::new(0));
    let store = FlakyStore::new(1, Rc::clone(&calls), std::io::ErrorKind::PermissionDenied);
    let mut retry = RetryingStore::new(store, 3, Duration::from_millis(1));
    assert!(retry.save(&ledger()).is_err());
    assert_eq!(*calls.borrow(), 1);
    let inner = retry.into_inner();
    assert!(matches!(
        inner.load(ledger().month()),
        Err(StoreError::NotFound(_))
    ));
}
