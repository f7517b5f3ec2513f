// src/error.rs

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the activity pipeline, the fan-out engine and the mailbox store.
///
/// Only a subset of these ever reaches the caller of [`crate::Pipeline::submit`]:
/// `PipelineClosed`, `QueueFull` and `SubmitTimeout`. Everything that happens after an
/// event is accepted into the queue is logged and counted by the worker instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActlogError {
  // --- Admission Errors ---
  #[error("Activity pipeline is closed and no longer accepts events")]
  PipelineClosed,
  #[error("Activity queue is full")]
  QueueFull, // Only with SubmitPolicy::Reject
  #[error("Timed out after {0:?} waiting for room in the activity queue")]
  SubmitTimeout(Duration),

  // --- Processing Errors (worker side) ---
  #[error("Failed to persist activity event: {0}")]
  Persistence(String),
  #[error("Notification fan-out failed: {0}")]
  Fanout(String),
  #[error("Membership directory error: {0}")]
  Directory(String),

  // --- Mailbox Errors ---
  #[error("Malformed notification record: {0}")]
  Serialization(String),
  #[error("Mailbox store error: {0}")]
  Store(String),

  #[error("Invalid argument provided: {0}")]
  InvalidArgument(String),
}

impl From<serde_json::Error> for ActlogError {
  fn from(e: serde_json::Error) -> Self {
    ActlogError::Serialization(e.to_string())
  }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for ActlogError {
  fn from(e: redis::RedisError) -> Self {
    ActlogError::Store(e.to_string())
  }
}

impl ActlogError {
  /// True for the errors `submit` returns when the event was *not* enqueued.
  pub fn is_admission_error(&self) -> bool {
    matches!(
      self,
      ActlogError::PipelineClosed | ActlogError::QueueFull | ActlogError::SubmitTimeout(_)
    )
  }
}
