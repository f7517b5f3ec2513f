// src/lib.rs

//! actlog - Asynchronous activity-log ingestion with per-user notification mailboxes.
//!
//! Request handlers hand [`ActivityEvent`]s to a [`Pipeline`], which queues them on a
//! bounded queue and lets a fixed pool of Tokio workers persist them through an
//! [`AuditSink`]. Events flagged for notification are expanded by the [`FanoutEngine`]
//! into one [`NotificationRecord`] per recipient and appended to each recipient's capped
//! [`Mailbox`].
//!
//! ```rust,ignore
//! let store = Arc::new(MemoryListStore::new());
//! let mailbox = Mailbox::new(store);
//! let fanout = FanoutEngine::new(Arc::new(directory));
//! let pipeline = Pipeline::start(PipelineOptions::default(), Arc::new(audit_log), fanout, mailbox.clone())?;
//!
//! pipeline.submit(event).await?;            // accepted, not yet processed
//! let inbox = mailbox.read_all("u2").await?; // most recent first
//! pipeline.shutdown_timeout(Duration::from_secs(5)).await;
//! ```

/// Durable audit-record sink interface.
pub mod audit;
/// Membership directory interface.
pub mod directory;
/// Defines the error type used throughout the library.
pub mod error;
/// Activity events and the typed entity descriptions that build them.
pub mod event;
/// Fan-out engine, notification records and mailboxes.
pub mod notification;
/// The bounded-queue worker pool and its lifecycle.
pub mod pipeline;
/// Queue and synchronization primitives used by the pipeline.
pub mod runtime;
/// Keyed list store hosting the mailboxes.
pub mod store;

// Re-export core types for user convenience.
pub use audit::{AuditSink, MemoryAuditLog};
pub use directory::{MembershipDirectory, StaticDirectory};
pub use error::ActlogError;
pub use event::{AccountId, ActivityEvent, ActivityType, EntityActivity, EntityDescriptor, UserId};
pub use notification::{FanoutEngine, Mailbox, MailboxOptions, MarkAllReadMode, NotificationRecord};
pub use pipeline::{Pipeline, PipelineOptions, PipelineState, PipelineStats, ShutdownReport, SubmitPolicy};
pub use store::{ListStore, MemoryListStore};
