//! Best-effort activity notification port.

use crate::recurrence::domain::{OwnerId, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity log operations.
pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

/// Fire-and-forget activity notification contract.
///
/// Callers never depend on the outcome: a failed `record` call is logged
/// and swallowed at the call site, never rethrown, so a secondary side
/// effect can never undo an orchestration's primary effect.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Records one activity entry.
    async fn record(&self, entry: ActivityEntry) -> ActivityLogResult<()>;
}

/// One activity notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    owner: OwnerId,
    action: String,
    subject: Option<TaskId>,
    detail: Option<String>,
}

impl ActivityEntry {
    /// Creates an entry for the given owner and action name.
    #[must_use]
    pub fn new(owner: OwnerId, action: impl Into<String>) -> Self {
        Self {
            owner,
            action: action.into(),
            subject: None,
            detail: None,
        }
    }

    /// Sets the task the entry concerns.
    #[must_use]
    pub const fn with_subject(mut self, subject: TaskId) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Attaches a detail message, typically an error description.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns the owning user's identifier.
    #[must_use]
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the concerned task, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<TaskId> {
        self.subject
    }

    /// Returns the detail message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// Errors returned by activity log implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityLogError {
    /// The notification sink rejected or could not accept the entry.
    #[error("activity log unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityLogError {
    /// Wraps a sink error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
