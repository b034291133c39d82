use std::cell::RefCell;
use std::thread::sleep;
use std::time::Duration;

use tracing::warn;

use super::{LedgerStore, StoreError};
use crate::core::{Ledger, MonthKey};

/// Wrapper that adds retry logic with exponential backoff to a ledger store.
///
/// Retryable errors are retried until `max_retries` is reached. The delay
/// starts at `base_delay` and doubles after each failed attempt.
pub struct RetryingStore<S> {
    inner: RefCell<S>,
    max_retries: u32,
    base_delay: Duration,
}

impl<S> RetryingStore<S> {
    /// Create a new `RetryingStore` wrapping `inner`.
    pub fn new(inner: S, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner: RefCell::new(inner),
            max_retries,
            base_delay,
        }
    }

    /// Consume the wrapper and return the inner store.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    fn with_retry<T, F>(&self, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut(&mut S) -> Result<T, StoreError>,
    {
        let mut attempt = 0;
        loop {
            let result = op(&mut self.inner.borrow_mut());
            match result {
                Ok(val) => return Ok(val),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let factor = 2f64.powi(attempt as i32);
                    let delay = self.base_delay.mul_f64(factor);
                    warn!(error = %e, attempt, ?delay, "Retrying ledger operation");
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: LedgerStore> LedgerStore for RetryingStore<S> {
    fn ensure(&mut self, key: MonthKey) -> Result<Ledger, StoreError> {
        self.with_retry(|inner| inner.ensure(key))
    }

    fn load(&self, key: MonthKey) -> Result<Ledger, StoreError> {
        self.with_retry(|inner| inner.load(key))
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), StoreError> {
        self.with_retry(|inner| inner.save(ledger))
    }
}
