//! Background Tasks Module
//!
//! Long-running maintenance tasks for the cache.

mod sweep;

pub use sweep::spawn_sweep_task;
