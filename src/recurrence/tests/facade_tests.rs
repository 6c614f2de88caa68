//! Dispatch, health, and maintenance tests for the lifecycle facade.

use crate::recurrence::adapters::memory::{
    InMemoryActivityLog, InMemoryCounterStore, InMemoryTaskStore,
};
use crate::recurrence::domain::{Cadence, OwnerId, TaskDraft, TaskId, TaskRecord};
use crate::recurrence::ports::{
    TaskFilter, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult,
};
use crate::recurrence::services::{
    DispatchError, DispatchResult, HealthReport, LifecycleFacade, LifecycleOperation,
    OccurrenceOrchestrator, SequenceAllocator,
};
use async_trait::async_trait;
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use mockall::mock;
use rstest::{fixture, rstest};
use std::sync::Arc;

type TestStore = InMemoryTaskStore<InMemoryCounterStore>;
type TestFacade = LifecycleFacade<TestStore, InMemoryActivityLog, DefaultClock>;

struct Harness {
    store: Arc<TestStore>,
    activity: Arc<InMemoryActivityLog>,
    clock: Arc<DefaultClock>,
    facade: TestFacade,
}

#[fixture]
fn harness() -> Harness {
    let allocator = SequenceAllocator::new(Arc::new(InMemoryCounterStore::new()));
    let store = Arc::new(InMemoryTaskStore::new(allocator));
    let activity = Arc::new(InMemoryActivityLog::new());
    let clock = Arc::new(DefaultClock);
    let orchestrator = OccurrenceOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&activity),
        Arc::clone(&clock),
    );
    let facade = LifecycleFacade::new(orchestrator, Arc::clone(&activity), Arc::clone(&clock));
    Harness {
        store,
        activity,
        clock,
        facade,
    }
}

fn owner() -> OwnerId {
    OwnerId::new("user-1").expect("valid owner id")
}

async fn seed_parent(harness: &Harness) -> TaskId {
    let due = harness.clock.utc() + Duration::days(1);
    let draft = TaskDraft::new(owner(), "Water plants", Cadence::Daily, &*harness.clock)
        .expect("valid draft")
        .with_due(due);
    harness
        .store
        .insert(draft)
        .await
        .expect("insert succeeds")
        .id()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_create_generates_the_window(harness: Harness) {
    let parent_id = seed_parent(&harness).await;

    let outcome = harness
        .facade
        .dispatch(&parent_id.to_string(), LifecycleOperation::Create, None)
        .await
        .expect("dispatch succeeds");

    assert_eq!(outcome.operation, LifecycleOperation::Create);
    assert_eq!(outcome.task_id, parent_id);
    let DispatchResult::Created { instances } = outcome.result else {
        panic!("expected a create payload");
    };
    assert_eq!(instances.len(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_named_parses_the_string_contract(harness: Harness) {
    let parent_id = seed_parent(&harness).await;

    let outcome = harness
        .facade
        .dispatch_named(&parent_id.to_string(), "create", Some("user-1"))
        .await
        .expect("dispatch succeeds");

    assert_eq!(outcome.operation, LifecycleOperation::Create);
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
#[case::non_numeric("abc")]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_rejects_malformed_task_ids(harness: Harness, #[case] raw: &str) {
    let result = harness
        .facade
        .dispatch(raw, LifecycleOperation::Create, None)
        .await;
    assert!(matches!(result, Err(DispatchError::InvalidTaskId(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_named_rejects_unknown_operations(harness: Harness) {
    let result = harness.facade.dispatch_named("1", "archive", None).await;
    assert!(matches!(result, Err(DispatchError::InvalidOperation(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_named_rejects_empty_owner(harness: Harness) {
    let result = harness
        .facade
        .dispatch_named("1", "delete", Some("  "))
        .await;
    assert!(matches!(result, Err(DispatchError::InvalidOwner(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_delete_requires_an_owner(harness: Harness) {
    let parent_id = seed_parent(&harness).await;
    let result = harness
        .facade
        .dispatch(&parent_id.to_string(), LifecycleOperation::Delete, None)
        .await;
    assert!(matches!(result, Err(DispatchError::MissingOwner)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_wraps_orchestration_failures(harness: Harness) {
    let result = harness
        .facade
        .dispatch("404", LifecycleOperation::Complete, Some(&owner()))
        .await;

    let Err(DispatchError::Processing {
        operation,
        task_id,
        source: _,
    }) = result
    else {
        panic!("expected a processing error");
    };
    assert_eq!(operation, LifecycleOperation::Complete);
    assert_eq!(task_id, TaskId::new(404));

    let entries = harness.activity.entries().expect("entries readable");
    assert!(entries
        .iter()
        .any(|entry| entry.action() == "COMPLETE_FAILED"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_failure_logging_is_best_effort(harness: Harness) {
    harness.activity.set_failing(true).expect("switch flips");

    let result = harness
        .facade
        .dispatch("404", LifecycleOperation::Complete, Some(&owner()))
        .await;

    assert!(matches!(result, Err(DispatchError::Processing { .. })));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_stats_when_reachable(harness: Harness) {
    let parent_id = seed_parent(&harness).await;
    harness
        .facade
        .dispatch(&parent_id.to_string(), LifecycleOperation::Create, None)
        .await
        .expect("dispatch succeeds");

    let report = harness.facade.health().await;
    let HealthReport::Healthy { stats } = report else {
        panic!("expected a healthy report");
    };
    assert_eq!(stats.total, 4);
    assert_eq!(stats.recurring_instances, 3);
}

mock! {
    BrokenStore {}

    #[async_trait]
    impl TaskStore for BrokenStore {
        async fn insert(&self, draft: TaskDraft) -> TaskStoreResult<TaskRecord>;
        async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>>;
        async fn find_one(&self, query: TaskQuery) -> TaskStoreResult<Option<TaskRecord>>;
        async fn find_many(&self, query: TaskQuery) -> TaskStoreResult<Vec<TaskRecord>>;
        async fn update(&self, record: &TaskRecord) -> TaskStoreResult<()>;
        async fn delete_many(&self, filter: TaskFilter) -> TaskStoreResult<u64>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_degrades_when_the_store_fails() {
    let mut broken = MockBrokenStore::new();
    broken.expect_find_many().returning(|_| {
        Err(TaskStoreError::persistence(std::io::Error::other(
            "store offline",
        )))
    });
    let activity = Arc::new(InMemoryActivityLog::new());
    let clock = Arc::new(DefaultClock);
    let orchestrator = OccurrenceOrchestrator::new(
        Arc::new(broken),
        Arc::clone(&activity),
        Arc::clone(&clock),
    );
    let facade = LifecycleFacade::new(orchestrator, activity, clock);

    let report = facade.health().await;
    let HealthReport::Degraded { error } = report else {
        panic!("expected a degraded report");
    };
    assert!(error.contains("store offline"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn maintenance_reports_the_sweep_summary(harness: Harness) {
    let parent_id = seed_parent(&harness).await;
    harness
        .facade
        .dispatch(&parent_id.to_string(), LifecycleOperation::Create, None)
        .await
        .expect("dispatch succeeds");
    harness
        .store
        .delete_many(TaskFilter::new().id(parent_id))
        .await
        .expect("delete succeeds");

    let report = harness
        .facade
        .maintenance()
        .await
        .expect("maintenance succeeds");
    assert_eq!(report.orphans_removed, 3);

    let repeat = harness
        .facade
        .maintenance()
        .await
        .expect("maintenance succeeds");
    assert_eq!(repeat.orphans_removed, 0);
}

#[rstest]
#[case::create("create", LifecycleOperation::Create)]
#[case::complete("Complete", LifecycleOperation::Complete)]
#[case::delete(" delete ", LifecycleOperation::Delete)]
fn operation_parses_canonical_names(#[case] raw: &str, #[case] expected: LifecycleOperation) {
    assert_eq!(LifecycleOperation::try_from(raw), Ok(expected));
}
