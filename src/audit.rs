// src/audit.rs

//! Durable audit-record store: append-only persistence of accepted events.

use crate::error::ActlogError;
use crate::event::ActivityEvent;

use async_trait::async_trait;

/// Appends accepted activity events to durable storage.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
  async fn persist(&self, event: &ActivityEvent) -> Result<(), ActlogError>;
}

/// Append-only in-memory audit log.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
  records: parking_lot::Mutex<Vec<ActivityEvent>>,
}

impl MemoryAuditLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.records.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.lock().is_empty()
  }

  /// Copy of everything persisted so far, in persistence order.
  pub fn snapshot(&self) -> Vec<ActivityEvent> {
    self.records.lock().clone()
  }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
  async fn persist(&self, event: &ActivityEvent) -> Result<(), ActlogError> {
    self.records.lock().push(event.clone());
    Ok(())
  }
}
