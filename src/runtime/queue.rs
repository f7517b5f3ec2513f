// src/runtime/queue.rs

//! Type aliases for the shared work queue based on `async-channel`.

use crate::event::ActivityEvent;

/// The producer side of the work queue. Cloneable; closing it closes it for every clone.
pub type EventSender = async_channel::Sender<ActivityEvent>;

/// The consumer side of the work queue. Cloned once per worker; each event is
/// delivered to exactly one receiver.
pub type EventReceiver = async_channel::Receiver<ActivityEvent>;

/// Creates the bounded work queue shared by submitters and workers.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
  async_channel::bounded(capacity.max(1))
}
