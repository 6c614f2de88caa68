//! Named-counter port backing sequence identifier allocation.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for counter store operations.
pub type CounterStoreResult<T> = Result<T, CounterStoreError>;

/// Atomic named-counter contract.
///
/// `increment_and_get` is the load-bearing primitive of the whole engine:
/// implementations must resolve the create-or-increment race as a single
/// atomic read-modify-write, never a read-then-write pair, so that
/// concurrent callers observe strictly increasing, collision-free values.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments the named counter and returns the new value,
    /// creating it at zero on first use (so the first call returns 1).
    async fn increment_and_get(&self, name: &str) -> CounterStoreResult<u64>;

    /// Creates the counter at `start` only when absent.
    ///
    /// Returns `false` without modifying anything when the counter already
    /// exists.
    async fn create_if_absent(&self, name: &str, start: u64) -> CounterStoreResult<bool>;

    /// Unconditionally overwrites the counter value.
    async fn overwrite(&self, name: &str, value: u64) -> CounterStoreResult<()>;

    /// Reads the counter value without modifying it, 0 when absent.
    async fn read(&self, name: &str) -> CounterStoreResult<u64>;
}

/// Errors returned by counter store implementations.
#[derive(Debug, Clone, Error)]
pub enum CounterStoreError {
    /// Persistence-layer failure.
    #[error("counter persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CounterStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
