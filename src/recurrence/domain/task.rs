//! Task record aggregate and its insert-shaped draft.

use super::{Cadence, OwnerId, RecordId, RecurrenceDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Attributes every instance shares with its defining task at generation
/// time. Copied, never propagated retroactively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedAttributes {
    /// Opaque priority label.
    pub priority: Option<String>,
    /// Opaque category label.
    pub category: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// External links carried with the task.
    pub links: Vec<String>,
}

/// Persisted task record, the unit of work maintained by this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    record_id: RecordId,
    owner: OwnerId,
    title: String,
    description: Option<String>,
    due: Option<DateTime<Utc>>,
    cadence: Cadence,
    completed: bool,
    recurring_parent: Option<TaskId>,
    parent: Option<TaskId>,
    shared: SharedAttributes,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Materializes a record from a draft and store-assigned identifiers.
    #[must_use]
    pub fn materialize(draft: TaskDraft, id: TaskId, record_id: RecordId) -> Self {
        Self {
            id,
            record_id,
            owner: draft.owner,
            title: draft.title,
            description: draft.description,
            due: draft.due,
            cadence: draft.cadence,
            completed: draft.completed,
            recurring_parent: draft.recurring_parent,
            parent: draft.parent,
            shared: draft.shared,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }

    /// Returns the application-level task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the internal storage identifier.
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Returns the owning user's identifier.
    #[must_use]
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due timestamp, if any.
    #[must_use]
    pub const fn due(&self) -> Option<DateTime<Utc>> {
        self.due
    }

    /// Returns the recurrence cadence.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns `true` when the task has been completed.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the chain root this instance belongs to, if it is an
    /// instance.
    #[must_use]
    pub const fn recurring_parent(&self) -> Option<TaskId> {
        self.recurring_parent
    }

    /// Returns the hierarchical subtask parent, if any. Unrelated to
    /// recurrence and preserved untouched by this engine.
    #[must_use]
    pub const fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    /// Returns the attributes shared across the chain at generation time.
    #[must_use]
    pub const fn shared(&self) -> &SharedAttributes {
        &self.shared
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when this task defines a recurring chain: it carries
    /// a recurrence cadence and is not itself a generated instance.
    #[must_use]
    pub const fn is_recurring_parent(&self) -> bool {
        self.cadence.is_recurring() && self.recurring_parent.is_none()
    }

    /// Returns `true` when this task is a generated occurrence.
    #[must_use]
    pub const fn is_instance(&self) -> bool {
        self.recurring_parent.is_some()
    }

    /// Re-stamps the chain root linkage. Idempotent; corrects drift.
    pub fn relink(&mut self, root: TaskId, clock: &impl Clock) {
        self.recurring_parent = Some(root);
        self.touch(clock);
    }

    /// Marks the task completed.
    pub fn complete(&mut self, clock: &impl Clock) {
        self.completed = true;
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Insert-shaped task without store-assigned identifiers.
///
/// The store's creation path allocates the [`TaskId`] (via the sequence
/// allocator) and the [`RecordId`], then materializes a [`TaskRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    owner: OwnerId,
    title: String,
    description: Option<String>,
    due: Option<DateTime<Utc>>,
    cadence: Cadence,
    completed: bool,
    recurring_parent: Option<TaskId>,
    parent: Option<TaskId>,
    shared: SharedAttributes,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskDraft {
    /// Creates a draft with required fields, timestamps taken from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceDomainError::EmptyTitle`] when the title is empty
    /// after trimming.
    pub fn new(
        owner: OwnerId,
        title: impl Into<String>,
        cadence: Cadence,
        clock: &impl Clock,
    ) -> Result<Self, RecurrenceDomainError> {
        let title_value = title.into();
        if title_value.trim().is_empty() {
            return Err(RecurrenceDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            owner,
            title: title_value,
            description: None,
            due: None,
            cadence,
            completed: false,
            recurring_parent: None,
            parent: None,
            shared: SharedAttributes::default(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Derives an instance draft from a chain member: shared attributes are
    /// copied, the chain root linkage is set, and the occurrence is due at
    /// the supplied date.
    #[must_use]
    pub fn instance_of(
        source: &TaskRecord,
        root: TaskId,
        due: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            owner: source.owner().clone(),
            title: source.title().to_owned(),
            description: source.description().map(ToOwned::to_owned),
            due: Some(due),
            cadence: source.cadence(),
            completed: false,
            recurring_parent: Some(root),
            parent: None,
            shared: source.shared().clone(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due timestamp.
    #[must_use]
    pub const fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    /// Sets the hierarchical subtask parent.
    #[must_use]
    pub const fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the chain root linkage.
    #[must_use]
    pub const fn with_recurring_parent(mut self, root: TaskId) -> Self {
        self.recurring_parent = Some(root);
        self
    }

    /// Sets the attributes shared across the chain.
    #[must_use]
    pub fn with_shared(mut self, shared: SharedAttributes) -> Self {
        self.shared = shared;
        self
    }

    /// Marks the draft as already completed.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}
