// src/notification/record.rs

use crate::error::ActlogError;
use crate::event::{AccountId, ActivityEvent, ActivityType, EntityDescriptor, UserId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-recipient projection of an [`ActivityEvent`], stored in that recipient's mailbox.
///
/// The id never changes after creation and the read flag only ever moves from
/// `false` to `true`: [`NotificationRecord::mark_read`] is the only mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
  id: Uuid,
  recipient_id: UserId,
  actor_id: UserId,
  account_id: AccountId,
  read: bool,
  created_at: DateTime<Utc>,
  entity: EntityDescriptor,
  activity_type: ActivityType,
  message: String,
  search_tag: String,
  notes: String,
}

impl NotificationRecord {
  /// Projects `event` for `recipient_id` with a freshly generated id.
  pub fn for_recipient(event: &ActivityEvent, recipient_id: impl Into<UserId>) -> Self {
    Self {
      id: Uuid::new_v4(),
      recipient_id: recipient_id.into(),
      actor_id: event.actor_id().to_string(),
      account_id: event.account_id().to_string(),
      read: false,
      created_at: Utc::now(),
      entity: event.entity().clone(),
      activity_type: event.activity_type(),
      message: event.message().to_string(),
      search_tag: event.search_tag().to_string(),
      notes: event.notes().to_string(),
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn recipient_id(&self) -> &str {
    &self.recipient_id
  }

  pub fn actor_id(&self) -> &str {
    &self.actor_id
  }

  pub fn account_id(&self) -> &str {
    &self.account_id
  }

  pub fn is_read(&self) -> bool {
    self.read
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn entity(&self) -> &EntityDescriptor {
    &self.entity
  }

  pub fn activity_type(&self) -> ActivityType {
    self.activity_type
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn search_tag(&self) -> &str {
    &self.search_tag
  }

  pub fn notes(&self) -> &str {
    &self.notes
  }

  /// Flags the record as read. Returns `true` if it was unread before.
  pub fn mark_read(&mut self) -> bool {
    let was_unread = !self.read;
    self.read = true;
    was_unread
  }

  /// Serializes the record into its stored (JSON) form.
  pub fn encode(&self) -> Result<String, ActlogError> {
    Ok(serde_json::to_string(self)?)
  }

  /// Parses a stored record.
  pub fn decode(raw: &str) -> Result<Self, ActlogError> {
    Ok(serde_json::from_str(raw)?)
  }
}
