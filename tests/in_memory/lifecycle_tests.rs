//! End-to-end lifecycle tests through the dispatch facade.

use crate::in_memory::helpers::{assert_chain_linkage, engine, owner, seed_parent, Engine};
use cadenza::recurrence::{
    domain::Cadence,
    ports::{TaskFilter, TaskQuery, TaskStore},
    services::{DispatchResult, LifecycleOperation},
};
use chrono::Duration;
use mockable::Clock;
use rstest::rstest;
use serde_json::Value;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_then_complete_keeps_the_window_at_three(engine: Engine) {
    let parent = seed_parent(&engine, Cadence::Daily).await;
    let parent_due = parent.due().expect("parent has a due date");

    let created = engine
        .facade
        .dispatch(&parent.id().to_string(), LifecycleOperation::Create, None)
        .await
        .expect("create dispatch succeeds");
    let DispatchResult::Created { instances } = created.result else {
        panic!("expected a create payload");
    };
    assert_eq!(instances.len(), 3);
    assert_chain_linkage(&instances, parent.id()).expect("chain linkage holds");
    for (instance, offset) in instances.iter().zip(1..) {
        assert_eq!(instance.due(), Some(parent_due + Duration::days(offset)));
    }

    let earliest = instances.first().expect("window is non-empty");
    let mut completed = engine
        .store
        .find_by_id(earliest.id())
        .await
        .expect("lookup succeeds")
        .expect("instance exists");
    completed.complete(&*engine.clock);
    engine
        .store
        .update(&completed)
        .await
        .expect("update succeeds");

    let advanced = engine
        .facade
        .dispatch(
            &completed.id().to_string(),
            LifecycleOperation::Complete,
            None,
        )
        .await
        .expect("complete dispatch succeeds");
    let DispatchResult::Completed { relinked, appended } = advanced.result else {
        panic!("expected a complete payload");
    };
    assert_eq!(
        relinked.expect("next instance exists").due(),
        Some(parent_due + Duration::days(2))
    );
    assert_eq!(
        appended.expect("window was advanced").due(),
        Some(parent_due + Duration::days(4))
    );

    let window = engine
        .store
        .find_many(TaskQuery::new(
            TaskFilter::new()
                .recurring_parent(parent.id())
                .completed(false)
                .due_after(Some(engine.clock.utc())),
        ))
        .await
        .expect("query succeeds");
    assert_eq!(window.len(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_dispatch_cascades_over_the_chain(engine: Engine) {
    let parent = seed_parent(&engine, Cadence::Weekly).await;
    engine
        .facade
        .dispatch(&parent.id().to_string(), LifecycleOperation::Create, None)
        .await
        .expect("create dispatch succeeds");

    let deleted = engine
        .facade
        .dispatch(
            &parent.id().to_string(),
            LifecycleOperation::Delete,
            Some(&owner()),
        )
        .await
        .expect("delete dispatch succeeds");
    let DispatchResult::Deleted { removed } = deleted.result else {
        panic!("expected a delete payload");
    };
    assert_eq!(removed, 3);

    let remaining = engine
        .store
        .find_many(TaskQuery::new(
            TaskFilter::new().recurring_parent(parent.id()),
        ))
        .await
        .expect("query succeeds");
    assert!(remaining.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outcome_serializes_for_the_request_layer(engine: Engine) {
    let parent = seed_parent(&engine, Cadence::Daily).await;

    let outcome = engine
        .facade
        .dispatch(&parent.id().to_string(), LifecycleOperation::Create, None)
        .await
        .expect("create dispatch succeeds");

    let value = outcome.to_value().expect("outcome serializes");
    assert_eq!(
        value.get("operation").and_then(Value::as_str),
        Some("create")
    );
    assert_eq!(
        value.get("task_id").and_then(Value::as_u64),
        Some(parent.id().value())
    );
    assert_eq!(
        value
            .get("result")
            .and_then(|result| result.get("kind"))
            .and_then(Value::as_str),
        Some("created")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn monthly_chains_clamp_to_short_months(engine: Engine) {
    // A monthly chain anchored near month-end exercises the clamping rule
    // end to end: the generated dates never skip a month.
    let parent = seed_parent(&engine, Cadence::Monthly).await;

    let created = engine
        .facade
        .dispatch(&parent.id().to_string(), LifecycleOperation::Create, None)
        .await
        .expect("create dispatch succeeds");
    let DispatchResult::Created { instances } = created.result else {
        panic!("expected a create payload");
    };

    let mut months = Vec::new();
    for instance in &instances {
        let due = instance.due().expect("instance has a due date");
        months.push(due);
    }
    assert_eq!(instances.len(), 3);
    assert_chain_linkage(&instances, parent.id()).expect("chain linkage holds");
    assert!(months
        .iter()
        .zip(months.iter().skip(1))
        .all(|(earlier, later)| earlier < later));
}
