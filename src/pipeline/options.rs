// src/pipeline/options.rs

use crate::error::ActlogError;
use std::time::Duration;

/// Default number of concurrent workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Default capacity of the shared work queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// What `submit` does when the work queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
  /// Suspend the caller until room frees up or the pipeline closes. No timeout.
  #[default]
  Block,
  /// Suspend for at most the given duration, then fail with `SubmitTimeout`.
  Timeout(Duration),
  /// Fail immediately with `QueueFull`.
  Reject,
}

/// Sizing and admission settings of a [`crate::Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
  pub worker_count: usize,
  pub queue_capacity: usize,
  pub submit_policy: SubmitPolicy,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self {
      worker_count: DEFAULT_WORKER_COUNT,
      queue_capacity: DEFAULT_QUEUE_CAPACITY,
      submit_policy: SubmitPolicy::Block,
    }
  }
}

impl PipelineOptions {
  pub fn new(worker_count: usize, queue_capacity: usize) -> Self {
    Self {
      worker_count,
      queue_capacity,
      ..Default::default()
    }
  }

  pub fn with_submit_policy(mut self, policy: SubmitPolicy) -> Self {
    self.submit_policy = policy;
    self
  }

  pub fn validate(&self) -> Result<(), ActlogError> {
    if self.worker_count == 0 {
      return Err(ActlogError::InvalidArgument(
        "worker_count must be at least 1".into(),
      ));
    }
    if self.queue_capacity == 0 {
      return Err(ActlogError::InvalidArgument(
        "queue_capacity must be at least 1".into(),
      ));
    }
    if self.submit_policy == SubmitPolicy::Timeout(Duration::ZERO) {
      return Err(ActlogError::InvalidArgument(
        "submit timeout must be non-zero (use SubmitPolicy::Reject to never wait)".into(),
      ));
    }
    Ok(())
  }
}
