//! Orphan sweep and maintenance worker tests.

use crate::in_memory::helpers::{engine, seed_parent, Engine};
use cadenza::maintenance::{MaintenanceConfig, MaintenanceWorker};
use cadenza::recurrence::{
    domain::Cadence,
    ports::{TaskFilter, TaskQuery, TaskStore},
    services::LifecycleOperation,
};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

async fn orphan_a_chain(engine: &Engine) -> u64 {
    let parent = seed_parent(engine, Cadence::Daily).await;
    engine
        .facade
        .dispatch(&parent.id().to_string(), LifecycleOperation::Create, None)
        .await
        .expect("create dispatch succeeds");
    engine
        .store
        .delete_many(TaskFilter::new().id(parent.id()))
        .await
        .expect("delete succeeds")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_once_sweeps_orphans(engine: Engine) {
    orphan_a_chain(&engine).await;
    let worker = MaintenanceWorker::new(Arc::clone(&engine.facade), MaintenanceConfig::new());

    let report = worker.run_once().await.expect("maintenance succeeds");
    assert_eq!(report.orphans_removed, 3);

    let repeat = worker.run_once().await.expect("maintenance succeeds");
    assert_eq!(repeat.orphans_removed, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn loop_sweeps_until_shutdown(engine: Engine) {
    orphan_a_chain(&engine).await;
    let worker = MaintenanceWorker::new(
        Arc::clone(&engine.facade),
        MaintenanceConfig::new().with_interval(Duration::from_millis(10)),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run_until_shutdown(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).expect("receiver still listening");
    handle.await.expect("worker loop exits cleanly");

    let orphans = engine
        .store
        .find_many(TaskQuery::new(TaskFilter::new().has_recurring_parent(true)))
        .await
        .expect("query succeeds");
    assert!(orphans.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn loop_exits_immediately_when_already_shut_down(engine: Engine) {
    let worker = MaintenanceWorker::new(Arc::clone(&engine.facade), MaintenanceConfig::new());
    let (_shutdown_tx, shutdown_rx) = watch::channel(true);

    // Returns without waiting for the hourly interval.
    worker.run_until_shutdown(shutdown_rx).await;
}
