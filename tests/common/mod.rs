// tests/common/mod.rs
#![allow(dead_code)]

use actlog::{
  ActivityEvent, ActivityType, ActlogError, AuditSink, EntityDescriptor, FanoutEngine, Mailbox, MemoryAuditLog,
  MemoryListStore, MembershipDirectory, Pipeline, PipelineOptions, StaticDirectory, UserId,
};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::Semaphore;

static INIT: Once = Once::new();

// This function will be called at the beginning of each test.
// The `Once` ensures the subscriber is only initialized a single time.
pub fn setup_logging() {
  INIT.call_once(|| {
    tracing_subscriber::fmt()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .with_test_writer()
      .init();
  });
}

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(100);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(5);

/// Plain event by `actor` on `account`, numbered through its notes.
pub fn event(actor: &str, account: &str, n: usize) -> ActivityEvent {
  ActivityEvent::builder(actor, account, ActivityType::Create)
    .entity(EntityDescriptor::new("stock", n.to_string()))
    .message(format!("created stock item #{}", n))
    .notes(n.to_string())
    .build()
}

/// Event flagged for notification.
pub fn notifying_event(actor: &str, account: &str, n: usize) -> ActivityEvent {
  ActivityEvent::builder(actor, account, ActivityType::Update)
    .entity(EntityDescriptor::new("stock", n.to_string()))
    .message(format!("updated stock item #{}", n))
    .notes(n.to_string())
    .notify(true)
    .build()
}

/// Polls `condition` every few milliseconds until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
  let deadline = tokio::time::Instant::now() + limit;
  loop {
    if condition() {
      return true;
    }
    if tokio::time::Instant::now() >= deadline {
      return false;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
  }
}

/// Everything a pipeline test needs to observe.
pub struct Harness {
  pub pipeline: Pipeline,
  pub mailbox: Mailbox,
  pub store: Arc<MemoryListStore>,
  pub directory: Arc<StaticDirectory>,
}

pub fn start_pipeline(options: PipelineOptions, sink: Arc<dyn AuditSink>) -> Harness {
  let store = Arc::new(MemoryListStore::new());
  let directory = Arc::new(StaticDirectory::new());
  let mailbox = Mailbox::new(store.clone());
  let fanout = FanoutEngine::new(directory.clone());
  let pipeline = Pipeline::start(options, sink, fanout, mailbox.clone()).expect("pipeline should start");
  Harness {
    pipeline,
    mailbox,
    store,
    directory,
  }
}

/// Audit sink that holds every event at a gate until the test opens it.
///
/// Each call to `persist` first announces itself on `entered`, then waits for a permit.
pub struct GatedSink {
  pub log: MemoryAuditLog,
  gate: Semaphore,
  entered_tx: async_channel::Sender<()>,
  pub entered: async_channel::Receiver<()>,
}

impl GatedSink {
  pub fn new() -> Arc<Self> {
    let (entered_tx, entered) = async_channel::unbounded();
    Arc::new(Self {
      log: MemoryAuditLog::new(),
      gate: Semaphore::new(0),
      entered_tx,
      entered,
    })
  }

  /// Lets `n` more events through.
  pub fn release(&self, n: usize) {
    self.gate.add_permits(n);
  }

  /// Waits until a worker is inside `persist`.
  pub async fn wait_entered(&self) {
    tokio::time::timeout(LONG_TIMEOUT, self.entered.recv())
      .await
      .expect("no worker entered the sink in time")
      .expect("entered channel closed");
  }
}

#[async_trait]
impl AuditSink for GatedSink {
  async fn persist(&self, event: &ActivityEvent) -> Result<(), ActlogError> {
    let _ = self.entered_tx.send(()).await;
    let permit = self
      .gate
      .acquire()
      .await
      .map_err(|_| ActlogError::Persistence("gate closed".into()))?;
    permit.forget();
    self.log.persist(event).await
  }
}

/// Audit sink that fails on events whose notes are `"fail"` and panics on `"panic"`.
#[derive(Default)]
pub struct FaultySink {
  pub log: MemoryAuditLog,
  pub attempts: AtomicUsize,
}

#[async_trait]
impl AuditSink for FaultySink {
  async fn persist(&self, event: &ActivityEvent) -> Result<(), ActlogError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    match event.notes() {
      "fail" => Err(ActlogError::Persistence("simulated write failure".into())),
      "panic" => panic!("simulated sink panic"),
      _ => self.log.persist(event).await,
    }
  }
}

/// Directory whose lookups always fail.
pub struct UnreachableDirectory;

#[async_trait]
impl MembershipDirectory for UnreachableDirectory {
  async fn resolve_account_members(&self, _account_id: &str) -> Result<Vec<UserId>, ActlogError> {
    Err(ActlogError::Directory("directory unreachable".into()))
  }
}
