//! Document-store port for task record persistence and querying.

use crate::recurrence::domain::{Cadence, OwnerId, TaskDraft, TaskId, TaskRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task record persistence contract, modelled on a document store.
///
/// The store addresses records by their application-level [`TaskId`]. The
/// creation path owns identifier assignment: `insert` consults the sequence
/// allocator for the [`TaskId`] and mints the internal record identifier.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new record, allocating its identifiers.
    async fn insert(&self, draft: TaskDraft) -> TaskStoreResult<TaskRecord>;

    /// Finds a record by task identifier.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>>;

    /// Returns the first record matching the query, honouring its sort
    /// order.
    async fn find_one(&self, query: TaskQuery) -> TaskStoreResult<Option<TaskRecord>>;

    /// Returns all records matching the query, honouring sort, skip, and
    /// limit.
    async fn find_many(&self, query: TaskQuery) -> TaskStoreResult<Vec<TaskRecord>>;

    /// Persists changes to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the record does not exist.
    async fn update(&self, record: &TaskRecord) -> TaskStoreResult<()>;

    /// Deletes every record matching the filter, returning the count
    /// removed. An empty match set is not an error.
    async fn delete_many(&self, filter: TaskFilter) -> TaskStoreResult<u64>;
}

/// Conjunctive record filter: every set bound must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    id: Option<TaskId>,
    owner: Option<OwnerId>,
    recurring_parent: Option<TaskId>,
    has_recurring_parent: Option<bool>,
    completed: Option<bool>,
    cadence: Option<Cadence>,
    due_after: Option<DateTime<Utc>>,
    due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Creates an unconstrained filter matching every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the filter to one task identifier.
    #[must_use]
    pub const fn id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Bounds the filter to one owner.
    #[must_use]
    pub fn owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Bounds the filter to instances of one chain root.
    #[must_use]
    pub const fn recurring_parent(mut self, root: TaskId) -> Self {
        self.recurring_parent = Some(root);
        self
    }

    /// Requires the chain linkage to be present (or absent).
    #[must_use]
    pub const fn has_recurring_parent(mut self, present: bool) -> Self {
        self.has_recurring_parent = Some(present);
        self
    }

    /// Bounds the filter by completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Bounds the filter to one cadence.
    #[must_use]
    pub const fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = Some(cadence);
        self
    }

    /// Requires a due date strictly after the bound. A `None` leaves the
    /// bound unset.
    #[must_use]
    pub const fn due_after(mut self, bound: Option<DateTime<Utc>>) -> Self {
        self.due_after = bound;
        self
    }

    /// Requires a due date strictly before the bound. A `None` leaves the
    /// bound unset.
    #[must_use]
    pub const fn due_before(mut self, bound: Option<DateTime<Utc>>) -> Self {
        self.due_before = bound;
        self
    }

    /// Evaluates the filter against one record.
    ///
    /// Due-date bounds only match records that carry a due date.
    #[must_use]
    pub fn matches(&self, record: &TaskRecord) -> bool {
        let id_ok = self.id.is_none_or(|id| record.id() == id);
        let owner_ok = self
            .owner
            .as_ref()
            .is_none_or(|owner| record.owner() == owner);
        let root_ok = self
            .recurring_parent
            .is_none_or(|root| record.recurring_parent() == Some(root));
        let linkage_ok = self
            .has_recurring_parent
            .is_none_or(|present| record.recurring_parent().is_some() == present);
        let completed_ok = self.completed.is_none_or(|flag| record.completed() == flag);
        let cadence_ok = self.cadence.is_none_or(|cadence| record.cadence() == cadence);
        let after_ok = self
            .due_after
            .is_none_or(|bound| record.due().is_some_and(|due| due > bound));
        let before_ok = self
            .due_before
            .is_none_or(|bound| record.due().is_some_and(|due| due < bound));
        id_ok
            && owner_ok
            && root_ok
            && linkage_ok
            && completed_ok
            && cadence_ok
            && after_ok
            && before_ok
    }
}

/// Sort order over record due dates. Records without a due date sort last
/// in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueSort {
    /// Earliest due date first.
    Ascending,
    /// Latest due date first.
    Descending,
}

/// Filtered, sorted, paginated record query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    filter: TaskFilter,
    sort: Option<DueSort>,
    limit: Option<usize>,
    skip: usize,
}

impl TaskQuery {
    /// Creates a query over the given filter with no sort or pagination.
    #[must_use]
    pub const fn new(filter: TaskFilter) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
            skip: 0,
        }
    }

    /// Sets the due-date sort order.
    #[must_use]
    pub const fn sort(mut self, order: DueSort) -> Self {
        self.sort = Some(order);
        self
    }

    /// Caps the number of returned records.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `skip` matching records.
    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Returns the query's filter.
    #[must_use]
    pub const fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Returns the due-date sort order, if any.
    #[must_use]
    pub const fn sort_order(&self) -> Option<DueSort> {
        self.sort
    }

    /// Returns the result cap, if any.
    #[must_use]
    pub const fn limit_count(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the number of leading matches to skip.
    #[must_use]
    pub const fn skip_count(&self) -> usize {
        self.skip
    }
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The record was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
