//! In-memory activity log for assertions in tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::recurrence::ports::{ActivityEntry, ActivityLog, ActivityLogError, ActivityLogResult};

/// Thread-safe in-memory activity log.
///
/// Entries are appended in call order. The failure switch makes every
/// subsequent `record` call fail, which the graceful-degradation tests use
/// to prove orchestration survives a broken notification sink.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    state: Arc<Mutex<ActivityLogState>>,
}

#[derive(Debug, Default)]
struct ActivityLogState {
    entries: Vec<ActivityEntry>,
    failing: bool,
}

impl InMemoryActivityLog {
    /// Creates an empty activity log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `record` call fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Unavailable`] when the shared state lock
    /// is poisoned.
    pub fn set_failing(&self, failing: bool) -> ActivityLogResult<()> {
        let mut state = self.locked()?;
        state.failing = failing;
        Ok(())
    }

    /// Returns a snapshot of the recorded entries.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Unavailable`] when the shared state lock
    /// is poisoned.
    pub fn entries(&self) -> ActivityLogResult<Vec<ActivityEntry>> {
        let state = self.locked()?;
        Ok(state.entries.clone())
    }

    fn locked(&self) -> ActivityLogResult<std::sync::MutexGuard<'_, ActivityLogState>> {
        self.state.lock().map_err(|err| {
            ActivityLogError::unavailable(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record(&self, entry: ActivityEntry) -> ActivityLogResult<()> {
        let mut state = self.locked()?;
        if state.failing {
            return Err(ActivityLogError::unavailable(std::io::Error::other(
                "activity sink configured to fail",
            )));
        }
        state.entries.push(entry);
        Ok(())
    }
}
