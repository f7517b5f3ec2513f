// src/pipeline/stats.rs

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time counters of a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
  /// Events accepted into the queue by `submit`.
  pub accepted: u64,
  /// Events the audit sink stored successfully.
  pub persisted: u64,
  pub persist_failures: u64,
  /// Events whose recipient resolution failed.
  pub fanout_failures: u64,
  pub notifications_delivered: u64,
  /// Individual mailbox appends that failed.
  pub delivery_failures: u64,
  /// Events whose processing panicked.
  pub panicked: u64,
  /// Events left in the queue by a forced shutdown.
  pub abandoned: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
  pub accepted: AtomicU64,
  pub persisted: AtomicU64,
  pub persist_failures: AtomicU64,
  pub fanout_failures: AtomicU64,
  pub notifications_delivered: AtomicU64,
  pub delivery_failures: AtomicU64,
  pub panicked: AtomicU64,
  pub abandoned: AtomicU64,
}

impl StatsCounters {
  pub fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  pub fn snapshot(&self) -> PipelineStats {
    PipelineStats {
      accepted: self.accepted.load(Ordering::Relaxed),
      persisted: self.persisted.load(Ordering::Relaxed),
      persist_failures: self.persist_failures.load(Ordering::Relaxed),
      fanout_failures: self.fanout_failures.load(Ordering::Relaxed),
      notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
      delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
      panicked: self.panicked.load(Ordering::Relaxed),
      abandoned: self.abandoned.load(Ordering::Relaxed),
    }
  }
}
