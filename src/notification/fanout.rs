// src/notification/fanout.rs

//! Expansion of one accepted event into per-recipient notification records.

use super::record::NotificationRecord;
use crate::directory::MembershipDirectory;
use crate::error::ActlogError;
use crate::event::{ActivityEvent, UserId};

use std::fmt;
use std::sync::Arc;

/// Resolves who should hear about an event and builds their notification records.
///
/// Recipient rule:
/// - an explicit recipient list on the event is used as-is, minus the actor;
/// - otherwise every member of the event's account, minus the actor.
///
/// The actor never receives a notification about their own activity.
#[derive(Clone)]
pub struct FanoutEngine {
  directory: Arc<dyn MembershipDirectory>,
}

impl fmt::Debug for FanoutEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FanoutEngine").finish_non_exhaustive()
  }
}

impl FanoutEngine {
  pub fn new(directory: Arc<dyn MembershipDirectory>) -> Self {
    Self { directory }
  }

  /// Returns the recipient set of `event`, excluding the actor.
  pub async fn resolve_recipients(&self, event: &ActivityEvent) -> Result<Vec<UserId>, ActlogError> {
    let candidates = if event.recipients().is_empty() {
      self
        .directory
        .resolve_account_members(event.account_id())
        .await
        .map_err(|e| {
          ActlogError::Fanout(format!(
            "resolving members of account '{}': {}",
            event.account_id(),
            e
          ))
        })?
    } else {
      event.recipients().to_vec()
    };

    Ok(
      candidates
        .into_iter()
        .filter(|user| user != event.actor_id())
        .collect(),
    )
  }

  /// One fresh [`NotificationRecord`] per resolved recipient.
  pub async fn expand(&self, event: &ActivityEvent) -> Result<Vec<NotificationRecord>, ActlogError> {
    let recipients = self.resolve_recipients(event).await?;
    tracing::trace!(
      account_id = event.account_id(),
      actor_id = event.actor_id(),
      explicit = !event.recipients().is_empty(),
      recipients = recipients.len(),
      "Expanded activity into notifications"
    );
    Ok(
      recipients
        .iter()
        .map(|recipient| NotificationRecord::for_recipient(event, recipient.as_str()))
        .collect(),
    )
  }
}
