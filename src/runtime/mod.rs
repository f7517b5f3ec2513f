// src/runtime/mod.rs

//! Core asynchronous primitives: the work queue, worker tracking and the stop signal.

pub mod queue;
pub(crate) mod stop_signal;
pub(crate) mod worker_group;

pub use queue::{event_queue, EventReceiver, EventSender};

// Sync Primitives
pub(crate) use stop_signal::{StopListener, StopSignal};
pub(crate) use worker_group::{WorkerGroup, WorkerToken};
