//! Query Module
//!
//! The orchestration layer between data-fetching call sites and the cache.

mod runner;

// Re-export public types
pub use runner::{QueryCache, QueryOptions};
