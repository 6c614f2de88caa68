//! Sequence identifier allocation over an atomic counter store.

use crate::recurrence::ports::{CounterStore, CounterStoreError};
use std::sync::Arc;
use thiserror::Error;

/// Failure of the identifier allocation service.
#[derive(Debug, Clone, Error)]
#[error("sequence allocation for counter '{counter}' failed: {source}")]
pub struct AllocationError {
    counter: String,
    source: CounterStoreError,
}

impl AllocationError {
    /// Returns the counter name the failed operation targeted.
    #[must_use]
    pub fn counter(&self) -> &str {
        &self.counter
    }
}

/// Result type for sequence allocation operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Issues strictly increasing, collision-free integers per named counter.
///
/// The allocator delegates entirely to the store's atomic increment
/// primitive; it holds no state of its own, so clones share the guarantee.
/// Values from [`SequenceAllocator::next`] are unique and strictly
/// increasing only while every caller uses `next` exclusively for that
/// name — mixing [`SequenceAllocator::reset`] with concurrent `next` calls
/// voids the guarantee.
#[derive(Debug, Clone)]
pub struct SequenceAllocator<C>
where
    C: CounterStore,
{
    store: Arc<C>,
}

impl<C> SequenceAllocator<C>
where
    C: CounterStore,
{
    /// Creates an allocator over the given counter store.
    #[must_use]
    pub const fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Allocates the next identifier for the named counter, creating the
    /// counter on first use so the first allocation returns 1.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] wrapping the underlying storage failure.
    pub async fn next(&self, name: &str) -> AllocationResult<u64> {
        self.store
            .increment_and_get(name)
            .await
            .map_err(|source| wrap(name, source))
    }

    /// Creates the named counter at `start` only when absent.
    ///
    /// Returns `false` when the counter already exists; an existing counter
    /// is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] wrapping the underlying storage failure.
    pub async fn initialize(&self, name: &str, start: u64) -> AllocationResult<bool> {
        self.store
            .create_if_absent(name, start)
            .await
            .map_err(|source| wrap(name, source))
    }

    /// Unconditionally overwrites the named counter.
    ///
    /// Unsafe for counters with already-issued identifiers: later
    /// allocations may repeat values handed out before the reset.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] wrapping the underlying storage failure.
    pub async fn reset(&self, name: &str, value: u64) -> AllocationResult<()> {
        self.store
            .overwrite(name, value)
            .await
            .map_err(|source| wrap(name, source))
    }

    /// Reads the named counter without modifying it, 0 when absent.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] wrapping the underlying storage failure.
    pub async fn current_value(&self, name: &str) -> AllocationResult<u64> {
        self.store
            .read(name)
            .await
            .map_err(|source| wrap(name, source))
    }
}

/// Ties a storage failure to the counter it targeted.
fn wrap(name: &str, source: CounterStoreError) -> AllocationError {
    AllocationError {
        counter: name.to_owned(),
        source,
    }
}
