// tests/backpressure.rs

use actlog::{ActlogError, PipelineOptions, PipelineState, SubmitPolicy};
use std::time::Duration;
use tokio::time::timeout;
use tokio_test::{assert_pending, assert_ready};

mod common;
use common::{event, start_pipeline, wait_until, GatedSink, LONG_TIMEOUT};

/// One worker held inside the sink plus a queue of two: the third queued event has
/// nowhere to go.
async fn saturate(policy: SubmitPolicy) -> (common::Harness, std::sync::Arc<GatedSink>) {
  let sink = GatedSink::new();
  let h = start_pipeline(PipelineOptions::new(1, 2).with_submit_policy(policy), sink.clone());

  h.pipeline.submit(event("u1", "acc", 0)).await.unwrap();
  sink.wait_entered().await;
  h.pipeline.submit(event("u1", "acc", 1)).await.unwrap();
  h.pipeline.submit(event("u1", "acc", 2)).await.unwrap();
  assert_eq!(h.pipeline.queued(), 2);
  (h, sink)
}

#[tokio::test]
async fn blocking_submit_waits_for_room() {
  common::setup_logging();
  let (h, sink) = saturate(SubmitPolicy::Block).await;

  let mut blocked = tokio_test::task::spawn(h.pipeline.submit(event("u1", "acc", 3)));
  assert_pending!(blocked.poll());

  // Let the worker finish one event and pull the next one off the queue.
  sink.release(1);
  sink.wait_entered().await;

  assert!(blocked.is_woken());
  let result = assert_ready!(blocked.poll());
  assert_eq!(result, Ok(()));
  drop(blocked);

  sink.release(3);
  let report = timeout(LONG_TIMEOUT, h.pipeline.shutdown(futures::future::pending()))
    .await
    .unwrap();
  assert_eq!(report.stats.persisted, 4);
}

#[tokio::test]
async fn blocked_submitter_is_released_by_shutdown() {
  common::setup_logging();
  let (h, sink) = saturate(SubmitPolicy::Block).await;

  let pipeline = h.pipeline.clone();
  let blocked = tokio::spawn(async move { pipeline.submit(event("u1", "acc", 3)).await });
  tokio::time::sleep(Duration::from_millis(20)).await;
  assert!(!blocked.is_finished());

  assert!(h.pipeline.close());
  let result = timeout(LONG_TIMEOUT, blocked).await.unwrap().unwrap();
  assert_eq!(result, Err(ActlogError::PipelineClosed));
  assert!(result.unwrap_err().is_admission_error());

  // Events accepted before the close are still drained.
  sink.release(3);
  let report = timeout(LONG_TIMEOUT, h.pipeline.shutdown(futures::future::pending()))
    .await
    .unwrap();
  assert_eq!(report.stats.persisted, 3);
  assert_eq!(report.stats.accepted, 3);
}

#[tokio::test]
async fn reject_policy_fails_fast_when_full() {
  common::setup_logging();
  let (h, sink) = saturate(SubmitPolicy::Reject).await;

  let result = h.pipeline.submit(event("u1", "acc", 3)).await;
  assert_eq!(result, Err(ActlogError::QueueFull));
  assert!(result.unwrap_err().is_admission_error());

  sink.release(1);
  sink.wait_entered().await;
  assert!(wait_until(LONG_TIMEOUT, || h.pipeline.queued() < 2).await);
  h.pipeline.submit(event("u1", "acc", 4)).await.unwrap();

  sink.release(3);
  h.pipeline.shutdown(futures::future::pending()).await;
  assert_eq!(h.pipeline.stats().accepted, 4);
}

#[tokio::test]
async fn timeout_policy_gives_up_after_the_limit() {
  common::setup_logging();
  let limit = Duration::from_millis(30);
  let (h, sink) = saturate(SubmitPolicy::Timeout(limit)).await;

  let result = h.pipeline.submit(event("u1", "acc", 3)).await;
  assert_eq!(result, Err(ActlogError::SubmitTimeout(limit)));
  assert!(result.unwrap_err().is_admission_error());
  assert_eq!(h.pipeline.state(), PipelineState::Accepting);

  sink.release(3);
  let report = h.pipeline.shutdown(futures::future::pending()).await;
  assert_eq!(report.stats.persisted, 3);
}

#[test]
fn only_refusals_count_as_admission_errors() {
  assert!(ActlogError::PipelineClosed.is_admission_error());
  assert!(ActlogError::QueueFull.is_admission_error());
  assert!(ActlogError::SubmitTimeout(Duration::from_millis(1)).is_admission_error());
  // Processing failures happen after admission and never reach the submitter.
  assert!(!ActlogError::Persistence("disk".into()).is_admission_error());
  assert!(!ActlogError::Fanout("directory".into()).is_admission_error());
  assert!(!ActlogError::Store("redis".into()).is_admission_error());
}
