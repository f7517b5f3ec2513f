// src/notification/mailbox.rs

//! Per-user capped mailboxes of [`NotificationRecord`]s.
//!
//! A mailbox is a list in the [`ListStore`], most-recent-first, never longer than
//! [`MailboxOptions::capacity`]. Growth is always push-to-front followed by a trim, so
//! the oldest entries fall off the back.
//!
//! Read-state changes are scan-and-replace: the whole list is loaded, matching entries
//! are re-encoded with `read = true` and written back at the index they were found at.
//! Because that is not atomic in the store, every mutation of one user's mailbox made
//! through the same [`Mailbox`] handle is serialized by a per-user lock.

use super::record::NotificationRecord;
use crate::error::ActlogError;
use crate::store::ListStore;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Hard upper bound on entries kept per mailbox. [`MailboxOptions::capacity`] may lower it,
/// never raise it.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 50;

/// Prefix of the store key holding a user's mailbox (`<prefix>:<user_id>`).
pub const DEFAULT_MAILBOX_KEY_PREFIX: &str = "notifications";

/// What `mark_all_read` flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkAllReadMode {
  /// Flip the first unread entry found (front to back) and stop.
  FirstUnread,
  /// Flip every unread entry.
  #[default]
  AllUnread,
}

#[derive(Debug, Clone)]
pub struct MailboxOptions {
  pub capacity: usize,
  pub key_prefix: String,
  pub mark_all_read_mode: MarkAllReadMode,
}

impl Default for MailboxOptions {
  fn default() -> Self {
    Self {
      capacity: DEFAULT_MAILBOX_CAPACITY,
      key_prefix: DEFAULT_MAILBOX_KEY_PREFIX.to_string(),
      mark_all_read_mode: MarkAllReadMode::default(),
    }
  }
}

impl MailboxOptions {
  pub fn validate(&self) -> Result<(), ActlogError> {
    if self.capacity == 0 || self.capacity > DEFAULT_MAILBOX_CAPACITY {
      return Err(ActlogError::InvalidArgument(format!(
        "mailbox capacity must be between 1 and {}",
        DEFAULT_MAILBOX_CAPACITY
      )));
    }
    if self.key_prefix.is_empty() {
      return Err(ActlogError::InvalidArgument(
        "mailbox key prefix must not be empty".into(),
      ));
    }
    Ok(())
  }
}

/// Handle to the mailbox store. Cloning is cheap and clones share the per-user locks.
#[derive(Clone)]
pub struct Mailbox {
  inner: Arc<MailboxInner>,
}

struct MailboxInner {
  store: Arc<dyn ListStore>,
  options: MailboxOptions,
  locks: LockTable,
}

impl fmt::Debug for Mailbox {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Mailbox")
      .field("options", &self.inner.options)
      .field("locked_users", &self.inner.locks.len())
      .finish()
  }
}

impl Mailbox {
  /// Creates a mailbox handle with default options.
  pub fn new(store: Arc<dyn ListStore>) -> Self {
    Self {
      inner: Arc::new(MailboxInner {
        store,
        options: MailboxOptions::default(),
        locks: LockTable::default(),
      }),
    }
  }

  pub fn with_options(store: Arc<dyn ListStore>, options: MailboxOptions) -> Result<Self, ActlogError> {
    options.validate()?;
    Ok(Self {
      inner: Arc::new(MailboxInner {
        store,
        options,
        locks: LockTable::default(),
      }),
    })
  }

  pub fn options(&self) -> &MailboxOptions {
    &self.inner.options
  }

  /// Store key of `user_id`'s mailbox.
  pub fn key_for(&self, user_id: &str) -> String {
    format!("{}:{}", self.inner.options.key_prefix, user_id)
  }

  /// Pushes `record` to the front of `user_id`'s mailbox and evicts anything past capacity.
  ///
  /// Fails only if the record could not be pushed. A failed trim leaves the record
  /// delivered and the mailbox over capacity until the next append trims it.
  pub async fn append(&self, user_id: &str, record: &NotificationRecord) -> Result<(), ActlogError> {
    let raw = record.encode()?;
    let key = self.key_for(user_id);
    let _lease = self.inner.locks.acquire(user_id).await;

    self.inner.store.push(&key, raw).await?;
    if let Err(e) = self
      .inner
      .store
      .trim_to_size(&key, self.inner.options.capacity)
      .await
    {
      tracing::warn!(
        user_id,
        notification_id = %record.id(),
        error = %e,
        "Failed to trim mailbox after append. Retrying on next append."
      );
    }
    tracing::trace!(user_id, notification_id = %record.id(), "Notification appended to mailbox");
    Ok(())
  }

  /// Returns the decoded mailbox, most-recent-first. Malformed entries are logged and skipped.
  pub async fn read_all(&self, user_id: &str) -> Result<Vec<NotificationRecord>, ActlogError> {
    let raw = self.inner.store.read_all(&self.key_for(user_id)).await?;
    Ok(
      decode_entries(user_id, &raw)
        .into_iter()
        .map(|(_, record)| record)
        .collect(),
    )
  }

  /// Number of unread, decodable entries.
  pub async fn unread_count(&self, user_id: &str) -> Result<usize, ActlogError> {
    Ok(
      self
        .read_all(user_id)
        .await?
        .iter()
        .filter(|r| !r.is_read())
        .count(),
    )
  }

  /// Marks the first entry whose id equals `notification_id` as read.
  ///
  /// Returns `false` when no entry has that id. Marking an already-read entry is a
  /// successful no-op.
  pub async fn mark_read(&self, user_id: &str, notification_id: Uuid) -> Result<bool, ActlogError> {
    let key = self.key_for(user_id);
    let _lease = self.inner.locks.acquire(user_id).await;

    let raw = self.inner.store.read_all(&key).await?;
    for (index, mut record) in decode_entries(user_id, &raw) {
      if record.id() != notification_id {
        continue;
      }
      if record.mark_read() {
        self.inner.store.replace_at(&key, index, record.encode()?).await?;
        tracing::debug!(user_id, %notification_id, index, "Notification marked read");
      }
      return Ok(true);
    }
    Ok(false)
  }

  /// Marks every entry whose id is in `notification_ids` as read, in one pass.
  /// Returns how many entries changed from unread to read.
  pub async fn mark_read_batch(&self, user_id: &str, notification_ids: &[Uuid]) -> Result<usize, ActlogError> {
    if notification_ids.is_empty() {
      return Ok(0);
    }
    let wanted: HashSet<Uuid> = notification_ids.iter().copied().collect();
    let key = self.key_for(user_id);
    let _lease = self.inner.locks.acquire(user_id).await;

    let raw = self.inner.store.read_all(&key).await?;
    let mut updated = 0;
    for (index, mut record) in decode_entries(user_id, &raw) {
      if wanted.contains(&record.id()) && record.mark_read() {
        self.inner.store.replace_at(&key, index, record.encode()?).await?;
        updated += 1;
      }
    }
    tracing::debug!(user_id, requested = wanted.len(), updated, "Notification batch marked read");
    Ok(updated)
  }

  /// Marks unread entries as read according to [`MailboxOptions::mark_all_read_mode`].
  /// Returns how many entries changed.
  pub async fn mark_all_read(&self, user_id: &str) -> Result<usize, ActlogError> {
    let mode = self.inner.options.mark_all_read_mode;
    let key = self.key_for(user_id);
    let _lease = self.inner.locks.acquire(user_id).await;

    let raw = self.inner.store.read_all(&key).await?;
    let mut updated = 0;
    for (index, mut record) in decode_entries(user_id, &raw) {
      if !record.mark_read() {
        continue;
      }
      self.inner.store.replace_at(&key, index, record.encode()?).await?;
      updated += 1;
      if mode == MarkAllReadMode::FirstUnread {
        break;
      }
    }
    tracing::debug!(user_id, ?mode, updated, "Mailbox marked read");
    Ok(updated)
  }

  /// Number of users with a mailbox operation currently holding or waiting on a lock.
  pub fn active_locks(&self) -> usize {
    self.inner.locks.len()
  }
}

/// Decodes stored entries, keeping each one's position in the list.
fn decode_entries(user_id: &str, raw: &[String]) -> Vec<(usize, NotificationRecord)> {
  raw
    .iter()
    .enumerate()
    .filter_map(|(index, entry)| match NotificationRecord::decode(entry) {
      Ok(record) => Some((index, record)),
      Err(e) => {
        tracing::warn!(user_id, index, error = %e, "Skipping malformed mailbox entry");
        None
      }
    })
    .collect()
}

// --- Per-user locking ---

/// Table of per-user async locks. Entries are dropped again once nobody holds or
/// waits on them, so the table only tracks users with in-flight mutations.
#[derive(Default)]
struct LockTable {
  locks: parking_lot::Mutex<HashMap<String, LockSlot>>,
}

struct LockSlot {
  lock: Arc<AsyncMutex<()>>,
  /// Leases holding or waiting on `lock`.
  leases: usize,
}

impl LockTable {
  async fn acquire(&self, user_id: &str) -> UserLease<'_> {
    let lock = {
      let mut locks = self.locks.lock();
      let slot = locks.entry(user_id.to_string()).or_insert_with(|| LockSlot {
        lock: Arc::new(AsyncMutex::new(())),
        leases: 0,
      });
      slot.leases += 1;
      slot.lock.clone()
    };
    // Registered before the wait so a cancelled waiter still releases its slot.
    let mut lease = UserLease {
      table: self,
      user_id: user_id.to_string(),
      guard: None,
    };
    lease.guard = Some(lock.lock_owned().await);
    lease
  }

  fn len(&self) -> usize {
    self.locks.lock().len()
  }
}

/// Hold (or pending hold) on one user's mailbox. Releases the lock and its table slot
/// on drop, including when the owning future is cancelled mid-wait.
struct UserLease<'a> {
  table: &'a LockTable,
  user_id: String,
  guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLease<'_> {
  fn drop(&mut self) {
    self.guard.take();
    let mut locks = self.table.locks.lock();
    if let Some(slot) = locks.get_mut(&self.user_id) {
      slot.leases -= 1;
      if slot.leases == 0 {
        locks.remove(&self.user_id);
      }
    }
  }
}
