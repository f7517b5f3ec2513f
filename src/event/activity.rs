// src/event/activity.rs

use super::entity::{ActivityDescription, EntityActivity};
use super::{AccountId, UserId};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of mutation an [`ActivityEvent`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
  Create,
  Update,
  Delete,
  BatchCreate,
  BatchDelete,
}

impl ActivityType {
  /// Past-tense verb used when rendering notification text.
  pub fn verb(&self) -> &'static str {
    match self {
      ActivityType::Create => "created",
      ActivityType::Update => "updated",
      ActivityType::Delete => "deleted",
      ActivityType::BatchCreate => "batch-created",
      ActivityType::BatchDelete => "batch-deleted",
    }
  }
}

impl fmt::Display for ActivityType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ActivityType::Create => "create",
      ActivityType::Update => "update",
      ActivityType::Delete => "delete",
      ActivityType::BatchCreate => "batch_create",
      ActivityType::BatchDelete => "batch_delete",
    };
    f.write_str(s)
  }
}

/// Identifies the entity an activity touched, e.g. `stock/42` or `stock/42 -> attachment/7`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
  pub model_name: String,
  pub model_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub_model_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub_model_id: Option<String>,
}

impl EntityDescriptor {
  pub fn new(model_name: impl Into<String>, model_id: impl Into<String>) -> Self {
    Self {
      model_name: model_name.into(),
      model_id: model_id.into(),
      sub_model_name: None,
      sub_model_id: None,
    }
  }

  pub fn with_sub_model(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
    self.sub_model_name = Some(name.into());
    self.sub_model_id = Some(id.into());
    self
  }
}

/// One accepted business mutation, the unit of work carried by the pipeline.
///
/// Events are immutable once built: all fields are private and only exposed through
/// shared accessors. Submitting an event moves it into the pipeline, which owns it until
/// a worker has finished processing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
  actor_id: UserId,
  account_id: AccountId,
  recipients: Vec<UserId>,
  entity: EntityDescriptor,
  activity_type: ActivityType,
  before: Option<String>,
  after: Option<String>,
  message: String,
  search_tag: String,
  notes: String,
  notify: bool,
}

impl ActivityEvent {
  /// Starts building an event performed by `actor_id` against `account_id`.
  pub fn builder(
    actor_id: impl Into<UserId>,
    account_id: impl Into<AccountId>,
    activity_type: ActivityType,
  ) -> ActivityEventBuilder {
    ActivityEventBuilder {
      event: ActivityEvent {
        actor_id: actor_id.into(),
        account_id: account_id.into(),
        recipients: Vec::new(),
        entity: EntityDescriptor::default(),
        activity_type,
        before: None,
        after: None,
        message: String::new(),
        search_tag: String::new(),
        notes: String::new(),
        notify: false,
      },
    }
  }

  /// Starts building an event from a typed entity activity.
  ///
  /// The account, entity descriptor and notification text are taken from
  /// [`EntityActivity::describe_activity`], so call sites never assemble them by hand.
  pub fn from_activity(
    actor_id: impl Into<UserId>,
    activity: &EntityActivity,
    activity_type: ActivityType,
  ) -> ActivityEventBuilder {
    let ActivityDescription {
      text,
      entity,
      account_id,
    } = activity.describe_activity(activity_type);
    let mut builder = Self::builder(actor_id, account_id, activity_type).entity(entity);
    builder.event.message = text;
    builder
  }

  pub fn actor_id(&self) -> &str {
    &self.actor_id
  }

  pub fn account_id(&self) -> &str {
    &self.account_id
  }

  /// Explicit recipient list. Empty means "every member of the account".
  pub fn recipients(&self) -> &[UserId] {
    &self.recipients
  }

  pub fn entity(&self) -> &EntityDescriptor {
    &self.entity
  }

  pub fn activity_type(&self) -> ActivityType {
    self.activity_type
  }

  pub fn before(&self) -> Option<&str> {
    self.before.as_deref()
  }

  pub fn after(&self) -> Option<&str> {
    self.after.as_deref()
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

  /// Whether accepted processing should fan notifications out to mailboxes.
  pub fn notify(&self) -> bool {
    self.notify
  }
}

/// Builder for [`ActivityEvent`]. `build()` is the only way to obtain an event.
#[derive(Debug, Clone)]
pub struct ActivityEventBuilder {
  event: ActivityEvent,
}

impl ActivityEventBuilder {
  pub fn entity(mut self, entity: EntityDescriptor) -> Self {
    self.event.entity = entity;
    self
  }

  pub fn recipients<I, S>(mut self, recipients: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<UserId>,
  {
    self.event.recipients = recipients.into_iter().map(Into::into).collect();
    self
  }

  pub fn before(mut self, snapshot: impl Into<String>) -> Self {
    self.event.before = Some(snapshot.into());
    self
  }

  pub fn after(mut self, snapshot: impl Into<String>) -> Self {
    self.event.after = Some(snapshot.into());
    self
  }

  pub fn message(mut self, message: impl Into<String>) -> Self {
    self.event.message = message.into();
    self
  }

  pub fn search_tag(mut self, tag: impl Into<String>) -> Self {
    self.event.search_tag = tag.into();
    self
  }

  pub fn notes(mut self, notes: impl Into<String>) -> Self {
    self.event.notes = notes.into();
    self
  }

  pub fn notify(mut self, notify: bool) -> Self {
    self.event.notify = notify;
    self
  }

  pub fn build(self) -> ActivityEvent {
    self.event
  }
}
