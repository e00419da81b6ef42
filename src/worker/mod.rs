//! Worker Module
//!
//! The bounded name queue and the background worker that drains it.

mod queue;
mod queue_worker;

pub use queue::{CardQueue, Consumer, QueueItem};
pub use queue_worker::{QueueWorker, WorkerCounters, WorkerState};
