//! Occurrence orchestration: window creation, advancement, cascade
//! deletion, and the orphan sweep.

use crate::recurrence::domain::{
    schedule, Cadence, OwnerId, RecurrenceRuleError, ScheduleError, TaskDraft, TaskId, TaskRecord,
};
use crate::recurrence::ports::{
    ActivityEntry, ActivityLog, DueSort, TaskFilter, TaskQuery, TaskStore, TaskStoreError,
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Target number of incomplete future instances maintained per chain.
pub const FORWARD_WINDOW: usize = 3;

/// Activity action names emitted by the orchestrator.
pub mod actions {
    /// A new occurrence was generated.
    pub const INSTANCE_CREATED: &str = "RECURRING_INSTANCE_CREATED";
    /// A whole chain was deleted in one cascade.
    pub const CHAIN_DELETED: &str = "RECURRING_CHAIN_DELETED";
    /// An orphaned instance was removed by the sweep.
    pub const ORPHAN_REMOVED: &str = "RECURRING_ORPHAN_REMOVED";
}

/// Errors returned by orchestration operations.
#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The defining task violates a recurrence eligibility rule.
    #[error(transparent)]
    Rule(#[from] RecurrenceRuleError),

    /// Recurrence date arithmetic failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// The task store failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for orchestration operations.
pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Outcome of completion-driven window advancement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    relinked: Option<TaskRecord>,
    appended: Option<TaskRecord>,
}

impl CompletionOutcome {
    /// Returns the next instance whose chain linkage was re-stamped, if
    /// any.
    #[must_use]
    pub const fn relinked(&self) -> Option<&TaskRecord> {
        self.relinked.as_ref()
    }

    /// Returns the instance appended to keep the forward window filled, if
    /// any.
    #[must_use]
    pub const fn appended(&self) -> Option<&TaskRecord> {
        self.appended.as_ref()
    }

    /// Consumes the outcome into its re-linked and appended halves.
    #[must_use]
    pub fn into_parts(self) -> (Option<TaskRecord>, Option<TaskRecord>) {
        (self.relinked, self.appended)
    }
}

/// Aggregate counts over the task store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    /// Total task records in scope.
    pub total: u64,
    /// Tasks defining a recurring chain.
    pub recurring_parents: u64,
    /// Generated occurrences.
    pub recurring_instances: u64,
    /// Tasks with daily cadence.
    pub daily: u64,
    /// Tasks with weekly cadence.
    pub weekly: u64,
    /// Tasks with monthly cadence.
    pub monthly: u64,
}

/// Owns the recurring-task invariants of the store: the forward window of
/// generated instances, the deletion cascade, and the orphan sweep.
///
/// No cross-operation locking is performed; concurrent completions on one
/// chain can overshoot the window target until later completions settle it
/// back down, and the orphan sweep reconciles races against deletion after
/// the fact.
#[derive(Debug, Clone)]
pub struct OccurrenceOrchestrator<S, A, C>
where
    S: TaskStore,
    A: ActivityLog,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    activity: Arc<A>,
    clock: Arc<C>,
}

impl<S, A, C> OccurrenceOrchestrator<S, A, C>
where
    S: TaskStore,
    A: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a new orchestrator over the given collaborators.
    #[must_use]
    pub const fn new(store: Arc<S>, activity: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            store,
            activity,
            clock,
        }
    }

    /// Generates the initial forward window for a newly created recurring
    /// task.
    ///
    /// A [`Cadence::None`] task is a no-op returning an empty list. Each
    /// successful insertion emits a best-effort activity notification;
    /// notification failures never abort generation.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::TaskNotFound`] when the parent does
    /// not exist, [`OrchestrationError::Rule`] when it violates the
    /// recurrence rules, and store/schedule failures otherwise.
    pub async fn on_create(&self, parent_id: TaskId) -> OrchestrationResult<Vec<TaskRecord>> {
        let parent = self.load(parent_id).await?;
        if !parent.cadence().is_recurring() {
            return Ok(Vec::new());
        }
        schedule::validate_recurrence_rules(&parent, self.clock.utc())?;
        let due = parent.due().ok_or(RecurrenceRuleError::MissingDueDate)?;
        let dates = schedule::generate_occurrences(due, parent.cadence(), FORWARD_WINDOW)?;

        let mut created = Vec::with_capacity(dates.len());
        for date in dates {
            let draft = TaskDraft::instance_of(&parent, parent_id, date, &*self.clock);
            let record = self.store.insert(draft).await?;
            self.notify(
                ActivityEntry::new(record.owner().clone(), actions::INSTANCE_CREATED)
                    .with_subject(record.id()),
            )
            .await;
            created.push(record);
        }
        Ok(created)
    }

    /// Advances the chain after a completion.
    ///
    /// Re-stamps the earliest incomplete instance due after the completed
    /// task with the resolved chain root (idempotent drift correction),
    /// then appends exactly one instance after the latest incomplete
    /// future instance so the forward window stays at its target. Either
    /// half can come up empty on an exhausted chain.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::TaskNotFound`] when the completed task
    /// does not exist, and store/schedule failures otherwise.
    pub async fn on_complete(&self, task_id: TaskId) -> OrchestrationResult<CompletionOutcome> {
        let task = self.load(task_id).await?;
        if !task.cadence().is_recurring() {
            return Ok(CompletionOutcome::default());
        }
        let root = task.recurring_parent().unwrap_or(task_id);

        let relinked = self.relink_next_instance(&task, root).await?;
        let appended = self.append_instance(&task, root).await?;
        Ok(CompletionOutcome { relinked, appended })
    }

    /// Deletes the whole chain a task belongs to, scoped to `owner`.
    ///
    /// The chain root is resolved preferring direct children of the task;
    /// when the task is itself a child with no children of its own, its own
    /// linkage is used. Zero matching records is success, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::TaskNotFound`] when the task does not
    /// exist, and store failures otherwise.
    pub async fn on_delete(&self, task_id: TaskId, owner: &OwnerId) -> OrchestrationResult<u64> {
        let task = self.load(task_id).await?;
        let direct_child = self
            .store
            .find_one(TaskQuery::new(TaskFilter::new().recurring_parent(task_id)))
            .await?;
        let root = if direct_child.is_some() {
            task_id
        } else {
            task.recurring_parent().unwrap_or(task_id)
        };

        let removed = self
            .store
            .delete_many(TaskFilter::new().recurring_parent(root).owner(owner.clone()))
            .await?;
        if removed > 0 {
            self.notify(
                ActivityEntry::new(owner.clone(), actions::CHAIN_DELETED).with_subject(root),
            )
            .await;
        }
        Ok(removed)
    }

    /// Removes instances whose chain root no longer exists.
    ///
    /// This is the reconciliation mechanism for the store's lack of
    /// referential integrity: generation is optimistic, and the sweep is
    /// the backstop. Failures while checking or deleting a single record
    /// are logged and skipped so one bad record cannot abort the sweep;
    /// re-running after a partial failure simply finds fewer orphans.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::Store`] when the initial scan fails.
    pub async fn sweep_orphans(&self) -> OrchestrationResult<u64> {
        let instances = self
            .store
            .find_many(TaskQuery::new(TaskFilter::new().has_recurring_parent(true)))
            .await?;

        let mut removed: u64 = 0;
        for instance in instances {
            let Some(root) = instance.recurring_parent() else {
                continue;
            };
            match self.store.find_by_id(root).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    removed += self.remove_orphan(&instance).await;
                }
                Err(err) => {
                    warn!(
                        task_id = %instance.id(),
                        root = %root,
                        error = %err,
                        "orphan sweep could not check chain root; skipping record"
                    );
                }
            }
        }
        Ok(removed)
    }

    /// Aggregates task counts, optionally scoped to one owner.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::Store`] when the scan fails.
    pub async fn stats(&self, owner: Option<&OwnerId>) -> OrchestrationResult<ChainStats> {
        let filter = owner.map_or_else(TaskFilter::new, |id| TaskFilter::new().owner(id.clone()));
        let records = self.store.find_many(TaskQuery::new(filter)).await?;

        let mut stats = ChainStats::default();
        for record in &records {
            stats.total += 1;
            if record.is_recurring_parent() {
                stats.recurring_parents += 1;
            }
            if record.is_instance() {
                stats.recurring_instances += 1;
            }
            match record.cadence() {
                Cadence::Daily => stats.daily += 1,
                Cadence::Weekly => stats.weekly += 1,
                Cadence::Monthly => stats.monthly += 1,
                Cadence::None => {}
            }
        }
        Ok(stats)
    }

    /// Re-stamps the earliest incomplete instance due strictly after the
    /// completed task with the resolved root.
    async fn relink_next_instance(
        &self,
        completed: &TaskRecord,
        root: TaskId,
    ) -> OrchestrationResult<Option<TaskRecord>> {
        let query = TaskQuery::new(
            TaskFilter::new()
                .recurring_parent(root)
                .completed(false)
                .due_after(completed.due()),
        )
        .sort(DueSort::Ascending);

        let Some(mut next) = self.store.find_one(query).await? else {
            return Ok(None);
        };
        next.relink(root, &*self.clock);
        self.store.update(&next).await?;
        Ok(Some(next))
    }

    /// Appends one instance after the latest incomplete future instance,
    /// keeping the forward window at its target size.
    async fn append_instance(
        &self,
        completed: &TaskRecord,
        root: TaskId,
    ) -> OrchestrationResult<Option<TaskRecord>> {
        let query = TaskQuery::new(
            TaskFilter::new()
                .recurring_parent(root)
                .completed(false)
                .due_after(Some(self.clock.utc())),
        )
        .sort(DueSort::Descending);

        let Some(latest) = self.store.find_one(query).await? else {
            return Ok(None);
        };
        let Some(latest_due) = latest.due() else {
            warn!(
                task_id = %latest.id(),
                "latest chain instance carries no due date; window not advanced"
            );
            return Ok(None);
        };

        let next_due = schedule::next_occurrence(latest_due, completed.cadence())?;
        let draft = TaskDraft::instance_of(completed, root, next_due, &*self.clock);
        let record = self.store.insert(draft).await?;
        self.notify(
            ActivityEntry::new(record.owner().clone(), actions::INSTANCE_CREATED)
                .with_subject(record.id()),
        )
        .await;
        Ok(Some(record))
    }

    /// Deletes one orphaned instance, emitting a cleanup notification.
    /// Failures are logged and absorbed.
    async fn remove_orphan(&self, instance: &TaskRecord) -> u64 {
        let deleted = self
            .store
            .delete_many(TaskFilter::new().id(instance.id()))
            .await;
        let count = match deleted {
            Ok(count) => count,
            Err(err) => {
                warn!(
                    task_id = %instance.id(),
                    error = %err,
                    "orphan deletion failed; continuing sweep"
                );
                return 0;
            }
        };
        if count > 0 {
            self.notify(
                ActivityEntry::new(instance.owner().clone(), actions::ORPHAN_REMOVED)
                    .with_subject(instance.id()),
            )
            .await;
        }
        count
    }

    /// Loads a task, mapping absence to [`OrchestrationError::TaskNotFound`].
    async fn load(&self, id: TaskId) -> OrchestrationResult<TaskRecord> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(OrchestrationError::TaskNotFound(id))
    }

    /// Records an activity entry, logging and swallowing any failure.
    async fn notify(&self, entry: ActivityEntry) {
        let action = entry.action().to_owned();
        if let Err(err) = self.activity.record(entry).await {
            warn!(action = %action, error = %err, "activity notification failed");
        }
    }
}
