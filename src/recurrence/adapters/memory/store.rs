//! In-memory document store for task records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::recurrence::domain::{RecordId, TaskDraft, TaskId, TaskRecord};
use crate::recurrence::ports::{
    CounterStore, DueSort, TaskFilter, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult,
};
use crate::recurrence::services::SequenceAllocator;

/// Counter name used for task identifier allocation.
pub const TASK_ID_COUNTER: &str = "tasks";

/// Thread-safe in-memory task document store.
///
/// The creation path consults the injected [`SequenceAllocator`] for the
/// application-level identifier and mints the internal record identifier
/// itself, matching the contract of [`TaskStore::insert`].
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore<C>
where
    C: CounterStore,
{
    allocator: SequenceAllocator<C>,
    records: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl<C> InMemoryTaskStore<C>
where
    C: CounterStore,
{
    /// Creates an empty store drawing identifiers from `allocator`.
    #[must_use]
    pub fn new(allocator: SequenceAllocator<C>) -> Self {
        Self {
            allocator,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn read_records(
        &self,
    ) -> TaskStoreResult<std::sync::RwLockReadGuard<'_, HashMap<TaskId, TaskRecord>>> {
        self.records
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_records(
        &self,
    ) -> TaskStoreResult<std::sync::RwLockWriteGuard<'_, HashMap<TaskId, TaskRecord>>> {
        self.records
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn collect(&self, query: &TaskQuery) -> TaskStoreResult<Vec<TaskRecord>> {
        let records = self.read_records()?;
        let mut matched: Vec<TaskRecord> = records
            .values()
            .filter(|record| query.filter().matches(record))
            .cloned()
            .collect();
        match query.sort_order() {
            Some(DueSort::Ascending) => {
                matched.sort_by_key(|record| (record.due().is_none(), record.due(), record.id()));
            }
            Some(DueSort::Descending) => {
                matched.sort_by_key(|record| {
                    (record.due().is_some(), record.due(), record.id())
                });
                matched.reverse();
            }
            None => matched.sort_by_key(TaskRecord::id),
        }
        let mut paged: Vec<TaskRecord> = matched.into_iter().skip(query.skip_count()).collect();
        if let Some(limit) = query.limit_count() {
            paged.truncate(limit);
        }
        Ok(paged)
    }
}

#[async_trait]
impl<C> TaskStore for InMemoryTaskStore<C>
where
    C: CounterStore,
{
    async fn insert(&self, draft: TaskDraft) -> TaskStoreResult<TaskRecord> {
        let id_value = self
            .allocator
            .next(TASK_ID_COUNTER)
            .await
            .map_err(TaskStoreError::persistence)?;
        let record = TaskRecord::materialize(draft, TaskId::new(id_value), RecordId::new());
        let mut records = self.write_records()?;
        records.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>> {
        let records = self.read_records()?;
        Ok(records.get(&id).cloned())
    }

    async fn find_one(&self, query: TaskQuery) -> TaskStoreResult<Option<TaskRecord>> {
        let mut matched = self.collect(&query.limit(1))?;
        Ok(matched.pop())
    }

    async fn find_many(&self, query: TaskQuery) -> TaskStoreResult<Vec<TaskRecord>> {
        self.collect(&query)
    }

    async fn update(&self, record: &TaskRecord) -> TaskStoreResult<()> {
        let mut records = self.write_records()?;
        if !records.contains_key(&record.id()) {
            return Err(TaskStoreError::NotFound(record.id()));
        }
        records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn delete_many(&self, filter: TaskFilter) -> TaskStoreResult<u64> {
        let mut records = self.write_records()?;
        let mut removed: u64 = 0;
        records.retain(|_, record| {
            if filter.matches(record) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
