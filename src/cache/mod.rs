//! Cache Module
//!
//! Provides the in-memory key-value store with lazy TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, EntryMetadata};
pub use stats::CacheStats;
pub use store::CacheStore;
