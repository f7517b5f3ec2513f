// src/pipeline/core.rs

use super::options::{PipelineOptions, SubmitPolicy};
use super::stats::{PipelineStats, StatsCounters};
use super::worker::{run_worker, WorkerContext};
use crate::audit::AuditSink;
use crate::error::ActlogError;
use crate::event::ActivityEvent;
use crate::notification::{FanoutEngine, Mailbox};
use crate::runtime::{event_queue, EventReceiver, EventSender, StopSignal, WorkerGroup};

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a pipeline. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
  /// `submit` accepts events.
  Accepting,
  /// Admission is closed, workers are still finishing.
  Draining,
  /// Every worker has exited.
  Stopped,
}

/// Outcome of [`Pipeline::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
  /// `true` if the cancel future fired before the queue was drained.
  pub forced: bool,
  /// Events still queued when the workers were stopped.
  pub abandoned: usize,
  pub stats: PipelineStats,
}

/// Shared state behind every [`Pipeline`] handle.
struct PipelineInner {
  options: PipelineOptions,
  queue_tx: EventSender,
  /// Kept only to account for what a forced stop leaves behind.
  queue_rx: EventReceiver,
  accepting: AtomicBool,
  workers: WorkerGroup,
  stop: StopSignal,
  stats: Arc<StatsCounters>,
}

/// Handle to the activity ingestion pipeline.
///
/// Create one per process with [`Pipeline::start`] and hand clones to whatever needs to
/// submit events. Cloning is cheap (`Arc` inside).
///
/// `submit` is best-effort: `Ok(())` means the event was accepted into the queue, not
/// that it was persisted or that its notifications were delivered. Failures after that
/// point are logged and show up in [`Pipeline::stats`] only.
///
/// If the last handle is dropped without a shutdown, the queue closes and the workers
/// drain whatever is left before exiting.
#[derive(Clone)]
pub struct Pipeline {
  inner: Arc<PipelineInner>,
}

impl fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("options", &self.inner.options)
      .field("state", &self.state())
      .field("queued", &self.queued())
      .finish()
  }
}

impl Pipeline {
  /// Spawns `options.worker_count` workers on the current Tokio runtime and returns the
  /// handle used to submit events.
  ///
  /// Must be called from within a Tokio runtime.
  pub fn start(
    options: PipelineOptions,
    sink: Arc<dyn AuditSink>,
    fanout: FanoutEngine,
    mailbox: Mailbox,
  ) -> Result<Self, ActlogError> {
    options.validate()?;

    let (queue_tx, queue_rx) = event_queue(options.queue_capacity);
    let stats = Arc::new(StatsCounters::default());
    let workers = WorkerGroup::new();
    let stop = StopSignal::new();
    let ctx = Arc::new(WorkerContext {
      sink,
      fanout,
      mailbox,
      stats: stats.clone(),
    });

    for worker_id in 0..options.worker_count {
      let token = workers.enter(worker_id);
      tokio::spawn(run_worker(
        worker_id,
        ctx.clone(),
        queue_rx.clone(),
        stop.subscribe(),
        token,
      ));
    }

    tracing::info!(
      workers = options.worker_count,
      queue_capacity = options.queue_capacity,
      submit_policy = ?options.submit_policy,
      "Activity pipeline started."
    );

    Ok(Self {
      inner: Arc::new(PipelineInner {
        options,
        queue_tx,
        queue_rx,
        accepting: AtomicBool::new(true),
        workers,
        stop,
        stats,
      }),
    })
  }

  pub fn options(&self) -> &PipelineOptions {
    &self.inner.options
  }

  /// Enqueues `event` for processing.
  ///
  /// Fails with `PipelineClosed` once shutdown has begun, without waiting. When the
  /// queue is full the behavior follows [`SubmitPolicy`]; with the default `Block` the
  /// caller is suspended until a worker frees a slot or the pipeline closes.
  pub async fn submit(&self, event: ActivityEvent) -> Result<(), ActlogError> {
    if !self.inner.accepting.load(Ordering::Acquire) {
      return Err(ActlogError::PipelineClosed);
    }

    let result = match self.inner.options.submit_policy {
      SubmitPolicy::Block => self
        .inner
        .queue_tx
        .send(event)
        .await
        .map_err(|_| ActlogError::PipelineClosed),
      SubmitPolicy::Reject => self.inner.queue_tx.try_send(event).map_err(|e| match e {
        async_channel::TrySendError::Full(_) => ActlogError::QueueFull,
        async_channel::TrySendError::Closed(_) => ActlogError::PipelineClosed,
      }),
      SubmitPolicy::Timeout(limit) => {
        match tokio::time::timeout(limit, self.inner.queue_tx.send(event)).await {
          Ok(Ok(())) => Ok(()),
          Ok(Err(_)) => Err(ActlogError::PipelineClosed),
          Err(_) => Err(ActlogError::SubmitTimeout(limit)),
        }
      }
    };

    match &result {
      Ok(()) => StatsCounters::bump(&self.inner.stats.accepted),
      Err(e) => tracing::debug!(error = %e, "Activity event refused"),
    }
    result
  }

  /// Phase 1 of shutdown: refuse new events and close the queue.
  ///
  /// Producers suspended on a full queue are woken with `PipelineClosed`. Events already
  /// queued stay there for the workers. Returns `true` for the call that closed it.
  pub fn close(&self) -> bool {
    if self.inner.accepting.swap(false, Ordering::AcqRel) {
      self.inner.queue_tx.close();
      tracing::info!(queued = self.queued(), "Activity pipeline closed to new events. Draining.");
      true
    } else {
      false
    }
  }

  /// Shuts the pipeline down in two phases.
  ///
  /// 1. Admission is closed (see [`Pipeline::close`]).
  /// 2. Workers drain the queue and exit. If `cancel` resolves first, every worker is
  ///    told to stop: each finishes the event it is processing and exits, and whatever is
  ///    still queued is abandoned.
  ///
  /// Not reversible. Calling it again after the pipeline stopped returns right away.
  pub async fn shutdown<F>(&self, cancel: F) -> ShutdownReport
  where
    F: Future<Output = ()>,
  {
    self.close();

    tokio::pin!(cancel);
    let forced = tokio::select! {
      biased;
      _ = self.inner.workers.wait() => false,
      _ = &mut cancel => {
        if self.inner.stop.raise() {
          tracing::warn!(
            queued = self.queued(),
            live_workers = self.inner.workers.live(),
            "Activity pipeline drain cancelled. Stopping workers."
          );
        }
        self.inner.workers.wait().await;
        true
      }
    };

    let abandoned = self.discard_queued();
    let stats = self.stats();
    tracing::info!(forced, abandoned, ?stats, "Activity pipeline stopped.");
    ShutdownReport {
      forced,
      abandoned,
      stats,
    }
  }

  /// [`Pipeline::shutdown`] that forces the stop after `grace`.
  pub async fn shutdown_timeout(&self, grace: Duration) -> ShutdownReport {
    self.shutdown(tokio::time::sleep(grace)).await
  }

  /// `true` once a forced stop has been signalled to the workers.
  pub fn is_stop_signalled(&self) -> bool {
    self.inner.stop.is_raised()
  }

  pub fn state(&self) -> PipelineState {
    if self.inner.accepting.load(Ordering::Acquire) {
      PipelineState::Accepting
    } else if self.inner.workers.live() > 0 {
      PipelineState::Draining
    } else {
      PipelineState::Stopped
    }
  }

  /// Events currently waiting in the queue.
  pub fn queued(&self) -> usize {
    self.inner.queue_tx.len()
  }

  /// Workers that have not exited.
  pub fn live_workers(&self) -> usize {
    self.inner.workers.live()
  }

  pub fn stats(&self) -> PipelineStats {
    self.inner.stats.snapshot()
  }

  /// Drops whatever the stopped workers left in the queue.
  fn discard_queued(&self) -> usize {
    let mut discarded = 0;
    while let Ok(event) = self.inner.queue_rx.try_recv() {
      discarded += 1;
      StatsCounters::bump(&self.inner.stats.abandoned);
      tracing::warn!(
        account_id = event.account_id(),
        actor_id = event.actor_id(),
        activity = %event.activity_type(),
        "Abandoning queued activity event at shutdown"
      );
    }
    discarded
  }
}
