// src/notification/mod.rs

//! Notification fan-out and the per-user mailbox store.

pub mod fanout;
pub mod mailbox;
pub mod record;

pub use fanout::FanoutEngine;
pub use mailbox::{Mailbox, MailboxOptions, MarkAllReadMode, DEFAULT_MAILBOX_CAPACITY, DEFAULT_MAILBOX_KEY_PREFIX};
pub use record::NotificationRecord;
