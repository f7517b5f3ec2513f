// src/pipeline/mod.rs

//! The ingestion pipeline: admission control, bounded queue and worker pool.

pub mod core;
pub mod options;
pub mod stats;
mod worker;

pub use self::core::{Pipeline, PipelineState, ShutdownReport};
pub use options::{PipelineOptions, SubmitPolicy, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};
pub use stats::PipelineStats;
