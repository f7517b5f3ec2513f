// tests/redis_store.rs
//
// Needs a reachable Redis server: `cargo test --features redis -- --ignored`.
// Host and port come from ACTLOG_REDIS_HOST / ACTLOG_REDIS_PORT (default localhost:6379).

#![cfg(feature = "redis")]

use actlog::store::{RedisListStore, RedisStoreConfig};
use actlog::{ActivityEvent, ActivityType, ActlogError, ListStore, Mailbox, MailboxOptions, NotificationRecord};
use std::sync::Arc;
use uuid::Uuid;

mod common;

fn config_from_env() -> RedisStoreConfig {
  let mut config = RedisStoreConfig::default();
  if let Ok(host) = std::env::var("ACTLOG_REDIS_HOST") {
    config.host = host;
  }
  if let Some(port) = std::env::var("ACTLOG_REDIS_PORT").ok().and_then(|p| p.parse().ok()) {
    config.port = port;
  }
  config
}

/// Fresh key per test so runs never see each other's lists.
fn scratch_key() -> String {
  format!("actlog-test:{}", Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn push_prepends_and_trim_keeps_the_front() {
  common::setup_logging();
  let store = RedisListStore::connect(&config_from_env()).await.unwrap();
  let key = scratch_key();

  for n in 0..5 {
    store.push(&key, n.to_string()).await.unwrap();
  }
  assert_eq!(store.read_all(&key).await.unwrap(), vec!["4", "3", "2", "1", "0"]);

  // LTRIM 0 2 keeps exactly three entries.
  store.trim_to_size(&key, 3).await.unwrap();
  assert_eq!(store.read_all(&key).await.unwrap(), vec!["4", "3", "2"]);

  // Trimming to a larger size is a no-op.
  store.trim_to_size(&key, 10).await.unwrap();
  assert_eq!(store.read_all(&key).await.unwrap().len(), 3);

  store.trim_to_size(&key, 0).await.unwrap();
  assert!(store.read_all(&key).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn replace_at_overwrites_by_index_and_rejects_out_of_range() {
  common::setup_logging();
  let store = RedisListStore::connect(&config_from_env()).await.unwrap();
  let key = scratch_key();

  for value in ["c", "b", "a"] {
    store.push(&key, value.to_string()).await.unwrap();
  }
  store.replace_at(&key, 2, "C".to_string()).await.unwrap();
  store.replace_at(&key, 0, "A".to_string()).await.unwrap();
  assert_eq!(store.read_all(&key).await.unwrap(), vec!["A", "b", "C"]);

  let err = store.replace_at(&key, 3, "x".to_string()).await.unwrap_err();
  assert!(matches!(err, ActlogError::Store(_)), "got {:?}", err);

  store.trim_to_size(&key, 0).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn mailbox_on_redis_caps_and_marks_read() {
  common::setup_logging();
  let store = Arc::new(RedisListStore::connect(&config_from_env()).await.unwrap());
  let options = MailboxOptions {
    capacity: 3,
    key_prefix: format!("actlog-test-{}", Uuid::new_v4()),
    ..Default::default()
  };
  let mailbox = Mailbox::with_options(store.clone(), options).unwrap();

  let mut inserted = Vec::new();
  for n in 0..5 {
    let event = ActivityEvent::builder("actor", "acc", ActivityType::Create)
      .message(format!("notification {}", n))
      .build();
    let record = NotificationRecord::for_recipient(&event, "u1");
    mailbox.append("u1", &record).await.unwrap();
    inserted.push(record);
  }

  let current = mailbox.read_all("u1").await.unwrap();
  assert_eq!(current.len(), 3);
  assert_eq!(current[0].id(), inserted[4].id());

  // Last entry in the list, written back through LSET.
  assert!(mailbox.mark_read("u1", inserted[2].id()).await.unwrap());
  let current = mailbox.read_all("u1").await.unwrap();
  assert!(current[2].is_read());
  assert_eq!(mailbox.unread_count("u1").await.unwrap(), 2);

  store.trim_to_size(&mailbox.key_for("u1"), 0).await.unwrap();
}
