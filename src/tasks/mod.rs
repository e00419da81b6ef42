//! Background Tasks Module
//!
//! Periodic housekeeping that runs alongside the queue worker.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired card records at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
