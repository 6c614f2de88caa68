//! Shared test helpers for in-memory lifecycle integration tests.

use cadenza::recurrence::{
    adapters::memory::{InMemoryActivityLog, InMemoryCounterStore, InMemoryTaskStore},
    domain::{Cadence, OwnerId, TaskDraft, TaskId, TaskRecord},
    ports::TaskStore,
    services::{LifecycleFacade, OccurrenceOrchestrator, SequenceAllocator},
};
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use std::sync::Arc;

/// The store type shared by the integration suite.
pub type TestStore = InMemoryTaskStore<InMemoryCounterStore>;
/// The facade type shared by the integration suite.
pub type TestFacade = LifecycleFacade<TestStore, InMemoryActivityLog, DefaultClock>;

/// Fully wired in-memory engine for integration tests.
pub struct Engine {
    /// The shared document store.
    pub store: Arc<TestStore>,
    /// The shared activity log.
    pub activity: Arc<InMemoryActivityLog>,
    /// The shared clock.
    pub clock: Arc<DefaultClock>,
    /// The facade under test.
    pub facade: Arc<TestFacade>,
}

/// Provides a fresh fully wired engine for each test.
#[fixture]
pub fn engine() -> Engine {
    let allocator = SequenceAllocator::new(Arc::new(InMemoryCounterStore::new()));
    let store = Arc::new(InMemoryTaskStore::new(allocator));
    let activity = Arc::new(InMemoryActivityLog::new());
    let clock = Arc::new(DefaultClock);
    let orchestrator = OccurrenceOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&activity),
        Arc::clone(&clock),
    );
    let facade = Arc::new(LifecycleFacade::new(
        orchestrator,
        Arc::clone(&activity),
        Arc::clone(&clock),
    ));
    Engine {
        store,
        activity,
        clock,
        facade,
    }
}

/// Returns the canonical test owner.
pub fn owner() -> OwnerId {
    OwnerId::new("user-1").expect("valid owner id")
}

/// Checks that every generated instance links back to the expected chain
/// root.
pub fn assert_chain_linkage(instances: &[TaskRecord], root: TaskId) -> eyre::Result<()> {
    for instance in instances {
        eyre::ensure!(
            instance.recurring_parent() == Some(root),
            "instance {} is linked to {:?}, expected {root}",
            instance.id(),
            instance.recurring_parent(),
        );
    }
    Ok(())
}

/// Inserts a recurring parent due tomorrow and returns its record.
pub async fn seed_parent(engine: &Engine, cadence: Cadence) -> TaskRecord {
    let due = engine.clock.utc() + Duration::days(1);
    let draft = TaskDraft::new(owner(), "Water plants", cadence, &*engine.clock)
        .expect("valid draft")
        .with_due(due);
    engine.store.insert(draft).await.expect("insert succeeds")
}
