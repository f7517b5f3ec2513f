// src/store/mod.rs

//! Keyed ordered-collection store hosting the per-user mailboxes.
//!
//! The store is an external collaborator (typically a cache service reached over the
//! network). Each key maps to a list of serialized records, index 0 being the front.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryListStore;
#[cfg(feature = "redis")]
pub use self::redis::{RedisListStore, RedisStoreConfig};

use crate::error::ActlogError;
use async_trait::async_trait;

#[async_trait]
pub trait ListStore: Send + Sync + 'static {
  /// Inserts `value` at the front (index 0) of the list at `key`, creating it if needed.
  async fn push(&self, key: &str, value: String) -> Result<(), ActlogError>;

  /// Keeps only the first `n` entries of the list at `key`.
  async fn trim_to_size(&self, key: &str, n: usize) -> Result<(), ActlogError>;

  /// Returns the whole list, front first. A missing key is an empty list.
  async fn read_all(&self, key: &str) -> Result<Vec<String>, ActlogError>;

  /// Overwrites the entry at `index`. Fails with `Store` if the index is out of range.
  async fn replace_at(&self, key: &str, index: usize, value: String) -> Result<(), ActlogError>;
}
