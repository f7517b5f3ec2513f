// src/runtime/stop_signal.rs

use tokio::sync::watch;

/// One-shot broadcast telling every worker to stop taking new events.
///
/// Internally a `tokio::sync::watch` flag, so a listener created (or polled) after the
/// signal was raised still observes it.
#[derive(Debug)]
pub(crate) struct StopSignal {
  sender: watch::Sender<bool>,
}

/// Worker-side handle of a [`StopSignal`].
#[derive(Debug, Clone)]
pub(crate) struct StopListener {
  receiver: watch::Receiver<bool>,
}

impl StopSignal {
  pub fn new() -> Self {
    let (sender, _) = watch::channel(false);
    Self { sender }
  }

  /// Raises the signal. Returns `true` only for the call that actually raised it.
  pub fn raise(&self) -> bool {
    let was_raised = self.sender.send_replace(true);
    if !was_raised {
      tracing::debug!(listeners = self.sender.receiver_count(), "Stop signal raised");
    }
    !was_raised
  }

  pub fn is_raised(&self) -> bool {
    *self.sender.borrow()
  }

  pub fn subscribe(&self) -> StopListener {
    StopListener {
      receiver: self.sender.subscribe(),
    }
  }
}

impl Default for StopSignal {
  fn default() -> Self {
    Self::new()
  }
}

impl StopListener {
  /// Resolves once the signal is raised.
  ///
  /// If the [`StopSignal`] is dropped without being raised this never resolves: the
  /// owner going away means "drain and exit", which workers detect through the queue.
  pub async fn stopped(&mut self) {
    let sender_gone = self.receiver.wait_for(|raised| *raised).await.is_err();
    if sender_gone {
      std::future::pending::<()>().await;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use tokio::time::timeout;

  #[tokio::test]
  async fn listeners_see_signal_raised_before_they_poll() {
    let signal = StopSignal::new();
    let mut a = signal.subscribe();
    let mut b = signal.subscribe();

    assert!(signal.raise());
    assert!(!signal.raise());
    assert!(signal.is_raised());

    timeout(Duration::from_millis(50), a.stopped()).await.unwrap();
    timeout(Duration::from_millis(50), b.stopped()).await.unwrap();
  }

  #[tokio::test]
  async fn dropped_signal_does_not_stop_listeners() {
    let signal = StopSignal::new();
    let mut listener = signal.subscribe();
    drop(signal);
    assert!(timeout(Duration::from_millis(30), listener.stopped()).await.is_err());
  }
}
