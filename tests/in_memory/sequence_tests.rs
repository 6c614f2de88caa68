//! Concurrency tests for sequence identifier allocation.

use cadenza::recurrence::{
    adapters::memory::InMemoryCounterStore, services::SequenceAllocator,
};
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_allocations_are_unique_and_gapless() {
    let allocator = Arc::new(SequenceAllocator::new(Arc::new(InMemoryCounterStore::new())));

    let mut workers = JoinSet::new();
    for _ in 0..10 {
        let shared = Arc::clone(&allocator);
        workers.spawn(async move { shared.next("tasks").await });
    }

    let mut issued = BTreeSet::new();
    while let Some(joined) = workers.join_next().await {
        let value = joined
            .expect("worker does not panic")
            .expect("allocation succeeds");
        assert!(issued.insert(value), "value {value} issued twice");
    }

    let expected: BTreeSet<u64> = (1..=10).collect();
    assert_eq!(issued, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn allocation_continues_past_concurrent_burst() {
    let allocator = Arc::new(SequenceAllocator::new(Arc::new(InMemoryCounterStore::new())));

    let mut workers = JoinSet::new();
    for _ in 0..10 {
        let shared = Arc::clone(&allocator);
        workers.spawn(async move { shared.next("tasks").await });
    }
    while let Some(joined) = workers.join_next().await {
        joined
            .expect("worker does not panic")
            .expect("allocation succeeds");
    }

    let next = allocator.next("tasks").await.expect("allocation succeeds");
    assert_eq!(next, 11);
    let peek = allocator
        .current_value("tasks")
        .await
        .expect("read succeeds");
    assert_eq!(peek, 11);
}
