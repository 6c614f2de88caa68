//! In-memory counter store for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::recurrence::ports::{CounterStore, CounterStoreError, CounterStoreResult};

/// Thread-safe in-memory named-counter store.
///
/// Each operation performs its whole read-modify-write under a single lock
/// acquisition, which is what makes `increment_and_get` atomic for
/// concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCounterStore {
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl InMemoryCounterStore {
    /// Creates an empty counter store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> CounterStoreResult<std::sync::MutexGuard<'_, HashMap<String, u64>>> {
        self.counters.lock().map_err(|err| {
            CounterStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment_and_get(&self, name: &str) -> CounterStoreResult<u64> {
        let mut counters = self.locked()?;
        let value = counters.entry(name.to_owned()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn create_if_absent(&self, name: &str, start: u64) -> CounterStoreResult<bool> {
        let mut counters = self.locked()?;
        if counters.contains_key(name) {
            return Ok(false);
        }
        counters.insert(name.to_owned(), start);
        Ok(true)
    }

    async fn overwrite(&self, name: &str, value: u64) -> CounterStoreResult<()> {
        let mut counters = self.locked()?;
        counters.insert(name.to_owned(), value);
        Ok(())
    }

    async fn read(&self, name: &str) -> CounterStoreResult<u64> {
        let counters = self.locked()?;
        Ok(counters.get(name).copied().unwrap_or(0))
    }
}
