// src/runtime/worker_group.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Tracks how many workers are still alive, in the spirit of Go's `sync.WaitGroup`.
///
/// Each worker holds a [`WorkerToken`] for its whole lifetime. The token is released on
/// drop, so a worker that exits by returning, panicking or being aborted is accounted
/// for the same way.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkerGroup {
  shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
  live: AtomicUsize,
  all_exited: Notify,
}

/// Proof of membership in a [`WorkerGroup`]. Dropping it marks the worker as exited.
#[derive(Debug)]
pub(crate) struct WorkerToken {
  shared: Arc<Shared>,
  worker_id: usize,
}

impl WorkerGroup {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a worker that is about to be spawned.
  pub fn enter(&self, worker_id: usize) -> WorkerToken {
    self.shared.live.fetch_add(1, Ordering::AcqRel);
    WorkerToken {
      shared: self.shared.clone(),
      worker_id,
    }
  }

  /// Number of workers that have not exited yet.
  pub fn live(&self) -> usize {
    self.shared.live.load(Ordering::Acquire)
  }

  /// Resolves once every registered worker has exited. Returns immediately if none are live.
  pub async fn wait(&self) {
    loop {
      let notified = self.shared.all_exited.notified();
      tokio::pin!(notified);
      // Register interest before checking, so an exit between the check and the
      // await still wakes us.
      notified.as_mut().enable();
      if self.live() == 0 {
        return;
      }
      notified.await;
    }
  }
}

impl Drop for WorkerToken {
  fn drop(&mut self) {
    let previous = self.shared.live.fetch_sub(1, Ordering::AcqRel);
    debug_assert!(previous > 0, "WorkerToken released with no live workers");
    if previous == 1 {
      tracing::trace!(worker = self.worker_id, "Last worker exited, waking waiters");
      self.shared.all_exited.notify_waiters();
    }
  }
}
