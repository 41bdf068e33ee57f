//! Single-slot memo for derived payloads.
//!
//! Holds one shared value that is built on first use and dropped by
//! `invalidate()` whenever the data it was derived from changes.

use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct Memo<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo { slot: Mutex::new(None) }
    }
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value, building it first if the slot is empty.
    ///
    /// A failed build leaves the slot empty so the next call retries.
    pub fn get_or_try_build<E>(&self, build: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(build()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    pub fn is_cached(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}
