//! Lifecycle dispatch facade: the single entry point consumed by the
//! request layer.

use crate::recurrence::domain::{OwnerId, RecurrenceDomainError, TaskId, TaskRecord};
use crate::recurrence::ports::{ActivityEntry, ActivityLog, TaskStore};
use crate::recurrence::services::orchestrator::{
    ChainStats, CompletionOutcome, OccurrenceOrchestrator, OrchestrationError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Lifecycle operations accepted by [`LifecycleFacade::dispatch`].
///
/// A closed set: invalid operation names fail at the string boundary in
/// [`LifecycleOperation::try_from`], never inside orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleOperation {
    /// Generate the initial forward window for a new recurring task.
    Create,
    /// Advance the window after a completion.
    Complete,
    /// Cascade-delete the whole chain.
    Delete,
}

impl LifecycleOperation {
    /// Returns the canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Complete => "complete",
            Self::Delete => "delete",
        }
    }

    /// Returns the action name recorded when the operation fails.
    #[must_use]
    pub const fn failure_action(self) -> &'static str {
        match self {
            Self::Create => "CREATE_FAILED",
            Self::Complete => "COMPLETE_FAILED",
            Self::Delete => "DELETE_FAILED",
        }
    }
}

impl TryFrom<&str> for LifecycleOperation {
    type Error = ParseOperationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "create" => Ok(Self::Create),
            "complete" => Ok(Self::Complete),
            "delete" => Ok(Self::Delete),
            _ => Err(ParseOperationError(value.to_owned())),
        }
    }
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing operation names from requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown lifecycle operation: '{0}', expected create|complete|delete")]
pub struct ParseOperationError(pub String);

/// Errors returned by the lifecycle facade.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The task identifier is not a non-empty integer string.
    #[error("task id must be a non-empty integer string, got '{0}'")]
    InvalidTaskId(String),

    /// The operation name is outside the allowed set.
    #[error(transparent)]
    InvalidOperation(#[from] ParseOperationError),

    /// The owner identifier failed validation.
    #[error(transparent)]
    InvalidOwner(#[from] RecurrenceDomainError),

    /// A delete dispatch arrived without an owner.
    #[error("delete dispatch requires an owner id")]
    MissingOwner,

    /// Orchestration failed; carries the attempted operation and cause.
    #[error("{operation} dispatch failed for task {task_id}: {source}")]
    Processing {
        /// The operation that was being dispatched.
        operation: LifecycleOperation,
        /// The task the dispatch targeted.
        task_id: TaskId,
        /// The underlying orchestration failure.
        #[source]
        source: OrchestrationError,
    },

    /// The maintenance sweep failed.
    #[error("maintenance sweep failed: {source}")]
    Maintenance {
        /// The underlying orchestration failure.
        #[source]
        source: OrchestrationError,
    },
}

/// Result type for facade operations.
pub type DispatchOutcomeResult = Result<DispatchOutcome, DispatchError>;

/// Per-operation dispatch payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchResult {
    /// Instances generated by a create dispatch.
    Created {
        /// The generated forward window.
        instances: Vec<TaskRecord>,
    },
    /// Window advancement performed by a complete dispatch.
    Completed {
        /// The re-linked next instance, if any.
        relinked: Option<TaskRecord>,
        /// The appended instance, if any.
        appended: Option<TaskRecord>,
    },
    /// Cascade performed by a delete dispatch.
    Deleted {
        /// Number of records removed.
        removed: u64,
    },
}

/// Successful dispatch summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// The dispatched operation.
    pub operation: LifecycleOperation,
    /// The task the dispatch targeted.
    pub task_id: TaskId,
    /// The operation's payload.
    pub result: DispatchResult,
}

impl DispatchOutcome {
    /// Renders the outcome as the JSON value handed to the request layer.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when serialization fails.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Facade health probe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthReport {
    /// Orchestrator and store are reachable.
    Healthy {
        /// Aggregate task counts.
        stats: ChainStats,
    },
    /// The stats probe failed.
    Degraded {
        /// Description of the causing error.
        error: String,
    },
}

/// Structured summary of one maintenance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    /// Orphaned instances removed by the sweep.
    pub orphans_removed: u64,
    /// When the sweep finished.
    pub swept_at: DateTime<Utc>,
}

/// Validates coarse lifecycle requests and forwards them to the
/// orchestrator, adding uniform error wrapping, health probing, and the
/// maintenance entry point.
#[derive(Debug, Clone)]
pub struct LifecycleFacade<S, A, C>
where
    S: TaskStore,
    A: ActivityLog,
    C: Clock + Send + Sync,
{
    orchestrator: OccurrenceOrchestrator<S, A, C>,
    activity: Arc<A>,
    clock: Arc<C>,
}

impl<S, A, C> LifecycleFacade<S, A, C>
where
    S: TaskStore,
    A: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a facade over the given orchestrator and collaborators.
    #[must_use]
    pub const fn new(
        orchestrator: OccurrenceOrchestrator<S, A, C>,
        activity: Arc<A>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            orchestrator,
            activity,
            clock,
        }
    }

    /// Dispatches a lifecycle operation with string-shaped inputs, the
    /// upward contract of the request layer.
    ///
    /// # Errors
    ///
    /// Returns a validation-class [`DispatchError`] before any
    /// orchestration call when the inputs are malformed, or
    /// [`DispatchError::Processing`] when orchestration fails.
    pub async fn dispatch_named(
        &self,
        raw_task_id: &str,
        raw_operation: &str,
        raw_owner: Option<&str>,
    ) -> DispatchOutcomeResult {
        let operation = LifecycleOperation::try_from(raw_operation)?;
        let owner = raw_owner.map(OwnerId::new).transpose()?;
        self.dispatch(raw_task_id, operation, owner.as_ref()).await
    }

    /// Dispatches a lifecycle operation.
    ///
    /// The task identifier is validated as a non-empty integer string and a
    /// delete dispatch must carry an owner; both checks fail before any
    /// orchestration call. An orchestration failure with a known owner is
    /// best-effort recorded as a `{OPERATION}_FAILED` activity entry (a
    /// failure to record is swallowed) before the wrapped error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns a validation-class [`DispatchError`] for malformed inputs,
    /// or [`DispatchError::Processing`] wrapping the orchestration failure.
    pub async fn dispatch(
        &self,
        raw_task_id: &str,
        operation: LifecycleOperation,
        owner: Option<&OwnerId>,
    ) -> DispatchOutcomeResult {
        let task_id = parse_task_id(raw_task_id)?;
        if operation == LifecycleOperation::Delete && owner.is_none() {
            return Err(DispatchError::MissingOwner);
        }

        let outcome = match operation {
            LifecycleOperation::Create => self
                .orchestrator
                .on_create(task_id)
                .await
                .map(|instances| DispatchResult::Created { instances }),
            LifecycleOperation::Complete => self
                .orchestrator
                .on_complete(task_id)
                .await
                .map(completion_result),
            LifecycleOperation::Delete => {
                let owner_id = owner.ok_or(DispatchError::MissingOwner)?;
                self.orchestrator
                    .on_delete(task_id, owner_id)
                    .await
                    .map(|removed| DispatchResult::Deleted { removed })
            }
        };

        let result = match outcome {
            Ok(result) => result,
            Err(source) => {
                self.record_failure(operation, task_id, owner, &source).await;
                return Err(DispatchError::Processing {
                    operation,
                    task_id,
                    source,
                });
            }
        };
        Ok(DispatchOutcome {
            operation,
            task_id,
            result,
        })
    }

    /// Probes orchestrator and store reachability.
    ///
    /// Never fails: a probe error is folded into
    /// [`HealthReport::Degraded`].
    pub async fn health(&self) -> HealthReport {
        self.orchestrator.stats(None).await.map_or_else(
            |err| HealthReport::Degraded {
                error: err.to_string(),
            },
            |stats| HealthReport::Healthy { stats },
        )
    }

    /// Runs the orphan sweep and reports a structured summary.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Maintenance`] when the sweep's initial scan
    /// fails.
    pub async fn maintenance(&self) -> Result<MaintenanceReport, DispatchError> {
        let orphans_removed = self
            .orchestrator
            .sweep_orphans()
            .await
            .map_err(|source| DispatchError::Maintenance { source })?;
        Ok(MaintenanceReport {
            orphans_removed,
            swept_at: self.clock.utc(),
        })
    }

    /// Best-effort `{OPERATION}_FAILED` activity record; a logging failure
    /// is itself swallowed.
    async fn record_failure(
        &self,
        operation: LifecycleOperation,
        task_id: TaskId,
        owner: Option<&OwnerId>,
        cause: &OrchestrationError,
    ) {
        let Some(owner_id) = owner else {
            return;
        };
        let entry = ActivityEntry::new(owner_id.clone(), operation.failure_action())
            .with_subject(task_id)
            .with_detail(cause.to_string());
        if let Err(err) = self.activity.record(entry).await {
            warn!(
                operation = %operation,
                task_id = %task_id,
                error = %err,
                "failed to record dispatch failure"
            );
        }
    }
}

/// Parses the application-level task identifier from its wire shape.
fn parse_task_id(raw: &str) -> Result<TaskId, DispatchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DispatchError::InvalidTaskId(raw.to_owned()));
    }
    trimmed
        .parse::<u64>()
        .map(TaskId::new)
        .map_err(|_| DispatchError::InvalidTaskId(raw.to_owned()))
}

/// Folds a completion outcome into its dispatch payload.
fn completion_result(outcome: CompletionOutcome) -> DispatchResult {
    let (relinked, appended) = outcome.into_parts();
    DispatchResult::Completed { relinked, appended }
}
