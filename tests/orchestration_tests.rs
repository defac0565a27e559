//! # Batch Start Orchestration Tests
//!
//! Drives `TaskStarter` against the in-memory channel and a mock repository.

mod common;

use std::time::Duration;

use common::{TestHarness, TestHarnessBuilder, TEST_GRACE};
use tasker_dispatch::constants::{queue_key, PROCESSING_SET_KEY};
use tasker_dispatch::error::TaskerError;
use tasker_dispatch::models::{AuthenticatedCaller, TaskUpdate};

fn caller() -> AuthenticatedCaller {
    AuthenticatedCaller::new("user-1")
}

/// Drop the starter and wait for every pending start time to be written
async fn drain_writer(harness: TestHarness) -> Vec<TaskUpdate> {
    let TestHarness {
        repository,
        starter,
        writer_handle,
        ..
    } = harness;
    drop(starter);
    writer_handle.await.expect("writer task panicked");
    repository.saved_updates()
}

#[tokio::test(start_paused = true)]
async fn test_processing_task_is_skipped() {
    let harness = TestHarnessBuilder::new().build();
    let busy = harness.repository.insert_task("kith");
    let fresh = harness.repository.insert_task("kith");
    harness
        .channel
        .add_member(PROCESSING_SET_KEY, &busy.id.to_string());

    let outcome = harness
        .starter
        .start_tasks(&caller(), &[busy.id.to_string(), fresh.id.to_string()])
        .await
        .unwrap();

    assert_eq!(outcome.enqueued, vec![fresh.id.to_string()]);
    assert_eq!(outcome.already_processing, vec![busy.id.to_string()]);
    assert_eq!(harness.channel.list(&queue_key("kith")), vec![fresh.id.to_string()]);
    assert_eq!(harness.channel.pipeline_executions(), 1);
    assert_eq!(harness.repository.lookups(), vec![fresh.id]);

    let updates = drain_writer(harness).await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].task_id(), fresh.id);
}

#[tokio::test(start_paused = true)]
async fn test_batch_shares_one_start_time_and_preserves_order() {
    let harness = TestHarnessBuilder::new().build();
    let first = harness.repository.insert_task("kith");
    let second = harness.repository.insert_task("footsites");
    let third = harness.repository.insert_task("kith");
    let ids = vec![first.id.to_string(), second.id.to_string(), third.id.to_string()];

    let outcome = harness.starter.start_tasks(&caller(), &ids).await.unwrap();

    assert_eq!(outcome.enqueued, ids);
    assert_eq!(
        harness.channel.list(&queue_key("kith")),
        vec![first.id.to_string(), third.id.to_string()]
    );
    assert_eq!(
        harness.channel.list(&queue_key("footsites")),
        vec![second.id.to_string()]
    );
    assert_eq!(harness.channel.pipeline_executions(), 1);

    let start_time = outcome.start_time.expect("start time recorded");
    let updates = drain_writer(harness).await;
    assert_eq!(updates.len(), 3);
    assert!(updates.iter().all(|u| u.start_time() == Some(start_time)));
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_failure_fails_call_without_start_times() {
    let harness = TestHarnessBuilder::new().build();
    let task = harness.repository.insert_task("kith");
    harness.channel.fail_pipelines(true);

    let result = harness
        .starter
        .start_tasks(&caller(), &[task.id.to_string()])
        .await;

    assert!(matches!(result, Err(TaskerError::MessagingError(_))));
    assert!(harness.channel.list(&queue_key("kith")).is_empty());
    assert!(drain_writer(harness).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unloadable_tasks_are_skipped() {
    let harness = TestHarnessBuilder::new().build();
    let good = harness.repository.insert_task("kith");
    let broken = harness.repository.insert_task("kith");
    harness.repository.fail_lookups_for(broken.id);
    let missing = uuid::Uuid::new_v4();

    let outcome = harness
        .starter
        .start_tasks(
            &caller(),
            &[
                "not-a-uuid".to_string(),
                broken.id.to_string(),
                missing.to_string(),
                good.id.to_string(),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.enqueued, vec![good.id.to_string()]);
    assert_eq!(
        outcome.unavailable,
        vec![
            "not-a-uuid".to_string(),
            broken.id.to_string(),
            missing.to_string()
        ]
    );
    assert_eq!(harness.channel.list(&queue_key("kith")), vec![good.id.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_to_start_skips_pipeline() {
    let harness = TestHarnessBuilder::new().build();
    let busy = harness.repository.insert_task("kith");
    harness
        .channel
        .add_member(PROCESSING_SET_KEY, &busy.id.to_string());

    let empty = harness.starter.start_tasks(&caller(), &[]).await.unwrap();
    assert!(empty.enqueued.is_empty());

    let skipped = harness
        .starter
        .start_tasks(&caller(), &[busy.id.to_string()])
        .await
        .unwrap();
    assert!(skipped.enqueued.is_empty());

    assert_eq!(harness.channel.pipeline_executions(), 0);
    assert!(drain_writer(harness).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dedup_failure_lets_task_through() {
    let harness = TestHarnessBuilder::new().build();
    let task = harness.repository.insert_task("kith");
    harness.channel.fail_membership_checks(true);

    let outcome = harness
        .starter
        .start_tasks(&caller(), &[task.id.to_string()])
        .await
        .unwrap();

    assert_eq!(outcome.enqueued, vec![task.id.to_string()]);
    assert_eq!(harness.channel.membership_checks(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_times_wait_for_grace_interval() {
    let harness = TestHarnessBuilder::new().build();
    let task = harness.repository.insert_task("kith");

    harness
        .starter
        .start_tasks(&caller(), &[task.id.to_string()])
        .await
        .unwrap();

    tokio::time::sleep(TEST_GRACE - Duration::from_secs(1)).await;
    assert!(harness.repository.saved_updates().is_empty());
    assert_eq!(harness.repository.task(task.id).unwrap().start_time, None);

    let updates = drain_writer(harness).await;
    assert_eq!(updates.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_worker_claims_task_is_noop() {
    let harness = TestHarnessBuilder::new().build();
    let task = harness.repository.insert_task("kith");
    let ids = [task.id.to_string()];

    harness.starter.start_tasks(&caller(), &ids).await.unwrap();
    // A worker popped the task and marked it as processing
    harness.channel.add_member(PROCESSING_SET_KEY, &ids[0]);
    let second = harness.starter.start_tasks(&caller(), &ids).await.unwrap();

    assert!(second.enqueued.is_empty());
    assert_eq!(harness.channel.list(&queue_key("kith")).len(), 1);
    assert_eq!(harness.channel.pipeline_executions(), 1);
}
