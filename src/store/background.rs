use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use super::{LedgerStore, StoreError};
use crate::core::Ledger;

/// Handle to a save running on a background thread.
///
/// Dropping the handle detaches the thread; the outcome is still logged.
pub struct PendingSave {
    handle: JoinHandle<Result<(), StoreError>>,
}

impl PendingSave {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the save completes and returns its outcome.
    pub fn wait(self) -> Result<(), StoreError> {
        self.handle.join().unwrap_or_else(|_| {
            Err(StoreError::Io(std::io::Error::other(
                "background save panicked",
            )))
        })
    }
}

/// Saves `ledger` through `store` without blocking the caller.
pub fn spawn_save<S>(mut store: S, ledger: Ledger) -> PendingSave
where
    S: LedgerStore + Send + 'static,
{
    let handle = thread::spawn(move || {
        let month = ledger.month();
        debug!(%month, "Background save started");
        let result = store.save(&ledger);
        if let Err(e) = &result {
            error!(%month, error = %e, "Background save failed");
        }
        result
    });
    PendingSave { handle }
}
