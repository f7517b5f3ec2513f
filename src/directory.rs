// src/directory.rs

//! Permission / membership directory: who holds access to an account.

use crate::error::ActlogError;
use crate::event::{AccountId, UserId};

use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves the permission holders of an account.
#[async_trait]
pub trait MembershipDirectory: Send + Sync + 'static {
  /// Returns every user with recorded access to `account_id`.
  /// An unknown account resolves to an empty list.
  async fn resolve_account_members(&self, account_id: &str) -> Result<Vec<UserId>, ActlogError>;
}

/// In-process directory backed by a map of account -> members.
#[derive(Debug, Default)]
pub struct StaticDirectory {
  accounts: parking_lot::RwLock<HashMap<AccountId, Vec<UserId>>>,
}

impl StaticDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces the member list of `account_id`.
  pub fn set_members<I, S>(&self, account_id: impl Into<AccountId>, members: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<UserId>,
  {
    let members = members.into_iter().map(Into::into).collect();
    self.accounts.write().insert(account_id.into(), members);
  }

  /// Grants `user_id` access to `account_id`. Granting twice is a no-op.
  pub fn grant(&self, account_id: &str, user_id: impl Into<UserId>) {
    let user_id = user_id.into();
    let mut accounts = self.accounts.write();
    let members = accounts.entry(account_id.to_string()).or_default();
    if !members.contains(&user_id) {
      members.push(user_id);
    }
  }

  /// Revokes access. Returns `true` if the user was a member.
  pub fn revoke(&self, account_id: &str, user_id: &str) -> bool {
    let mut accounts = self.accounts.write();
    match accounts.get_mut(account_id) {
      Some(members) => {
        let before = members.len();
        members.retain(|m| m != user_id);
        members.len() != before
      }
      None => false,
    }
  }
}

#[async_trait]
impl MembershipDirectory for StaticDirectory {
  async fn resolve_account_members(&self, account_id: &str) -> Result<Vec<UserId>, ActlogError> {
    Ok(self.accounts.read().get(account_id).cloned().unwrap_or_default())
  }
}
