// src/store/memory.rs

use super::ListStore;
use crate::error::ActlogError;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};

/// In-process [`ListStore`]. Every operation is atomic per call.
#[derive(Debug, Default)]
pub struct MemoryListStore {
  lists: parking_lot::RwLock<HashMap<String, VecDeque<String>>>,
}

impl MemoryListStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Length of the list at `key` (0 when absent).
  pub fn len(&self, key: &str) -> usize {
    self.lists.read().get(key).map_or(0, VecDeque::len)
  }

  /// Number of keys currently holding a list.
  pub fn key_count(&self) -> usize {
    self.lists.read().len()
  }
}

#[async_trait]
impl ListStore for MemoryListStore {
  async fn push(&self, key: &str, value: String) -> Result<(), ActlogError> {
    self
      .lists
      .write()
      .entry(key.to_string())
      .or_default()
      .push_front(value);
    Ok(())
  }

  async fn trim_to_size(&self, key: &str, n: usize) -> Result<(), ActlogError> {
    let mut lists = self.lists.write();
    if n == 0 {
      lists.remove(key);
    } else if let Some(list) = lists.get_mut(key) {
      list.truncate(n);
    }
    Ok(())
  }

  async fn read_all(&self, key: &str) -> Result<Vec<String>, ActlogError> {
    Ok(
      self
        .lists
        .read()
        .get(key)
        .map(|list| list.iter().cloned().collect())
        .unwrap_or_default(),
    )
  }

  async fn replace_at(&self, key: &str, index: usize, value: String) -> Result<(), ActlogError> {
    let mut lists = self.lists.write();
    let slot = lists
      .get_mut(key)
      .and_then(|list| list.get_mut(index))
      .ok_or_else(|| ActlogError::Store(format!("index {} out of range for key '{}'", index, key)))?;
    *slot = value;
    Ok(())
  }
}
