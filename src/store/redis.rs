// src/store/redis.rs

//! [`ListStore`] backed by Redis lists (`LPUSH` / `LTRIM` / `LRANGE` / `LSET`).

use super::ListStore;
use crate::error::ActlogError;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Connection settings for [`RedisListStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
  pub host: String,
  pub port: u16,
  pub password: Option<String>,
  pub db: u8,
}

impl Default for RedisStoreConfig {
  fn default() -> Self {
    Self {
      host: "localhost".to_string(),
      port: 6379,
      password: None,
      db: 0,
    }
  }
}

impl RedisStoreConfig {
  pub fn connection_url(&self) -> String {
    match &self.password {
      Some(password) => format!("redis://:{}@{}:{}/{}", password, self.host, self.port, self.db),
      None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
    }
  }
}

/// Redis-hosted mailbox lists. The connection manager reconnects on its own and is
/// cheap to clone, so each call works on its own handle.
#[derive(Clone)]
pub struct RedisListStore {
  conn: ConnectionManager,
}

impl RedisListStore {
  pub async fn connect(config: &RedisStoreConfig) -> Result<Self, ActlogError> {
    let client = Client::open(config.connection_url())
      .map_err(|e| ActlogError::Store(format!("Failed to create Redis client: {}", e)))?;
    let conn = ConnectionManager::new(client)
      .await
      .map_err(|e| ActlogError::Store(format!("Failed to connect to Redis: {}", e)))?;
    tracing::debug!(host = %config.host, port = config.port, db = config.db, "Connected Redis mailbox store");
    Ok(Self { conn })
  }
}

#[async_trait]
impl ListStore for RedisListStore {
  async fn push(&self, key: &str, value: String) -> Result<(), ActlogError> {
    let mut conn = self.conn.clone();
    let _: () = conn.lpush(key, value).await?;
    Ok(())
  }

  async fn trim_to_size(&self, key: &str, n: usize) -> Result<(), ActlogError> {
    let mut conn = self.conn.clone();
    if n == 0 {
      // LTRIM key 0 -1 would keep everything.
      let _: () = conn.del(key).await?;
    } else {
      let stop = isize::try_from(n - 1).unwrap_or(isize::MAX);
      let _: () = conn.ltrim(key, 0, stop).await?;
    }
    Ok(())
  }

  async fn read_all(&self, key: &str) -> Result<Vec<String>, ActlogError> {
    let mut conn = self.conn.clone();
    let values: Vec<String> = conn.lrange(key, 0, -1).await?;
    Ok(values)
  }

  async fn replace_at(&self, key: &str, index: usize, value: String) -> Result<(), ActlogError> {
    let index = isize::try_from(index)
      .map_err(|_| ActlogError::InvalidArgument(format!("list index {} too large", index)))?;
    let mut conn = self.conn.clone();
    let _: () = conn.lset(key, index, value).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn connection_url_includes_password_when_set() {
    let mut config = RedisStoreConfig::default();
    assert_eq!(config.connection_url(), "redis://localhost:6379/0");

    config.password = Some("s3cret".into());
    config.db = 2;
    assert_eq!(config.connection_url(), "redis://:s3cret@localhost:6379/2");
  }
}
