// src/pipeline/worker.rs

use super::stats::StatsCounters;
use crate::audit::AuditSink;
use crate::event::ActivityEvent;
use crate::notification::{FanoutEngine, Mailbox};
use crate::runtime::{EventReceiver, StopListener, WorkerToken};

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Collaborators shared by every worker of one pipeline.
pub(crate) struct WorkerContext {
  pub sink: Arc<dyn AuditSink>,
  pub fanout: FanoutEngine,
  pub mailbox: Mailbox,
  pub stats: Arc<StatsCounters>,
}

/// The main loop of one worker.
///
/// Waits on {stop signal, next event}. The stop signal wins when both are ready, but an
/// event that has been dequeued always runs to completion first. The loop also ends when
/// the queue is closed and fully drained.
pub(crate) async fn run_worker(
  worker_id: usize,
  ctx: Arc<WorkerContext>,
  queue: EventReceiver,
  mut stop: StopListener,
  _token: WorkerToken, // Released when this future completes or is dropped.
) {
  tracing::debug!(worker = worker_id, "Activity worker starting.");

  loop {
    tokio::select! {
      biased;

      _ = stop.stopped() => {
        tracing::debug!(worker = worker_id, queued = queue.len(), "Stop signal received. Worker exiting.");
        break;
      }

      next = queue.recv() => {
        match next {
          Ok(event) => {
            let outcome = AssertUnwindSafe(process_event(worker_id, &ctx, &event))
              .catch_unwind()
              .await;
            if outcome.is_err() {
              StatsCounters::bump(&ctx.stats.panicked);
              tracing::error!(
                worker = worker_id,
                account_id = event.account_id(),
                model = %event.entity().model_name,
                "Processing an activity event panicked. Event dropped, worker continues."
              );
            }
          }
          Err(_) => {
            tracing::debug!(worker = worker_id, "Work queue closed and drained. Worker exiting.");
            break;
          }
        }
      }
    }
  }
}

/// Persists one event and, if it asks for it, fans notifications out to mailboxes.
///
/// Every failure is logged and counted here; nothing propagates to the submitter.
/// An event that could not be persisted is not fanned out.
pub(crate) async fn process_event(worker_id: usize, ctx: &WorkerContext, event: &ActivityEvent) {
  if let Err(e) = ctx.sink.persist(event).await {
    StatsCounters::bump(&ctx.stats.persist_failures);
    tracing::error!(
      worker = worker_id,
      account_id = event.account_id(),
      actor_id = event.actor_id(),
      activity = %event.activity_type(),
      error = %e,
      "Failed to persist activity event"
    );
    return;
  }
  StatsCounters::bump(&ctx.stats.persisted);
  tracing::trace!(worker = worker_id, account_id = event.account_id(), "Activity event persisted");

  if !event.notify() {
    return;
  }

  let records = match ctx.fanout.expand(event).await {
    Ok(records) => records,
    Err(e) => {
      StatsCounters::bump(&ctx.stats.fanout_failures);
      tracing::warn!(
        worker = worker_id,
        account_id = event.account_id(),
        error = %e,
        "Notification fan-out failed"
      );
      return;
    }
  };

  for record in &records {
    match ctx.mailbox.append(record.recipient_id(), record).await {
      Ok(()) => StatsCounters::bump(&ctx.stats.notifications_delivered),
      Err(e) => {
        StatsCounters::bump(&ctx.stats.delivery_failures);
        tracing::warn!(
          worker = worker_id,
          user_id = record.recipient_id(),
          notification_id = %record.id(),
          error = %e,
          "Failed to deliver notification to mailbox"
        );
      }
    }
  }
}
