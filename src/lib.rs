//! Catalog Cache - client-side query caching for the catalog storefront
//!
//! Sits between data-fetching call sites and the network: an in-memory
//! key-value store with TTL expiration, wrapped by a query resolver that
//! serves cached values, invokes an async producer on a miss, and routes
//! producer failures through an error-reporting collaborator.

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod report;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheStore, EntryMetadata};
pub use config::CacheConfig;
pub use error::{QueryError, Result};
pub use query::{QueryCache, QueryOptions};
pub use report::{ErrorContext, ErrorReporter, Severity, TracingReporter};
pub use tasks::spawn_sweep_task;
