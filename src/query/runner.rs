//! Query Runner
//!
//! `QueryCache` resolves a value for a key either from the cache store or by
//! invoking an asynchronous producer, storing successful results back and
//! forwarding failures to the error reporter before re-raising them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::{QueryError, Result};
use crate::report::{ErrorContext, ErrorReporter, Severity};

// == Query Options ==
/// Per-call options for `QueryCache::run`.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Overrides the store's default TTL for this key
    pub ttl: Option<Duration>,
    /// Use a different cache key than the query identity, so logically
    /// distinct callers can share one cached value
    pub cache_key_override: Option<String>,
}

// == Query Cache ==
/// Cached query resolver shared process-wide.
///
/// Construct one at startup and share it via `Arc`. Callers must namespace
/// keys by logical value shape (`"movie:42"` vs `"list:42"`); the store is
/// type-erased and a key reused across incompatible shapes surfaces as
/// [`QueryError::Shape`] at a later read.
pub struct QueryCache {
    /// Shared cache store
    store: Arc<RwLock<CacheStore>>,
    /// Collaborator that producer failures are forwarded to
    reporter: Arc<dyn ErrorReporter>,
    /// Per-effective-key gates coalescing concurrent misses
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl QueryCache {
    // == Constructors ==
    /// Creates a new QueryCache over an existing store.
    pub fn new(store: Arc<RwLock<CacheStore>>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            store,
            reporter,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a new QueryCache with a fresh store built from configuration.
    pub fn from_config(config: &CacheConfig, reporter: Arc<dyn ErrorReporter>) -> Self {
        let store = CacheStore::new(config.default_ttl());
        Self::new(Arc::new(RwLock::new(store)), reporter)
    }

    // == Run ==
    /// Resolves a value for `key`, consulting the cache before `producer`.
    ///
    /// On a cache hit the producer is not invoked and the reporter is not
    /// touched. On a miss the producer is invoked exactly once; a successful
    /// result is written through to the store (with `options.ttl` when set)
    /// and returned, a failure is forwarded to the reporter with the original
    /// and effective keys as context and then re-raised. Failures are never
    /// cached.
    ///
    /// Concurrent misses for the same effective key are coalesced: the second
    /// caller waits for the first producer to settle and then re-checks the
    /// cache, so it observes a hit when the first call succeeded and falls
    /// through to its own producer when it failed.
    ///
    /// # Arguments
    /// * `key` - Non-empty logical query key
    /// * `producer` - Async closure computing a fresh value on a miss
    /// * `options` - Per-call TTL and cache-key override
    pub async fn run<T, F, Fut>(&self, key: &str, producer: F, options: QueryOptions) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if key.is_empty() {
            return Err(QueryError::EmptyKey);
        }

        let effective_key = options.cache_key_override.as_deref().unwrap_or(key);

        let gate = self.inflight_gate(effective_key).await;
        let permit = gate.lock().await;

        let result = self
            .resolve(key, effective_key, producer, options.ttl)
            .await;

        drop(permit);
        self.release_gate(effective_key, gate).await;

        result
    }

    /// Hit-check, produce, and write-through for one `run` invocation.
    ///
    /// Called with the in-flight gate for `effective_key` held. The store
    /// lock is never held across the producer await.
    async fn resolve<T, F, Fut>(
        &self,
        key: &str,
        effective_key: &str,
        producer: F,
        ttl: Option<Duration>,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        {
            let mut store = self.store.write().await;
            if let Some(raw) = store.get(effective_key) {
                debug!(key, effective_key, "cache hit");
                return serde_json::from_value(raw).map_err(|source| QueryError::Shape {
                    key: effective_key.to_string(),
                    source,
                });
            }
        }

        debug!(key, effective_key, "cache miss, invoking producer");

        match producer().await {
            Ok(value) => {
                let raw =
                    serde_json::to_value(&value).map_err(|source| QueryError::Encode {
                        key: effective_key.to_string(),
                        source,
                    })?;

                let mut store = self.store.write().await;
                store.set(effective_key.to_string(), raw, ttl);
                Ok(value)
            }
            Err(source) => {
                let context = ErrorContext {
                    key: key.to_string(),
                    effective_key: effective_key.to_string(),
                };

                // The reporter is fire-and-forget: its own failure must not
                // displace the producer failure being propagated.
                if let Err(report_err) =
                    self.reporter.report(&source, Severity::Error, &context)
                {
                    warn!(key, "error reporter failed: {report_err:#}");
                }

                Err(QueryError::Producer {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    // == In-flight Gates ==
    /// Returns the gate for an effective key, creating it on first use.
    async fn inflight_gate(&self, effective_key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(
            inflight
                .entry(effective_key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drops a gate reference, removing the map entry once no caller waits
    /// on it.
    async fn release_gate(&self, effective_key: &str, gate: Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // Two references mean the map and ourselves; any waiter holds a third.
        if Arc::strong_count(&gate) == 2 {
            inflight.remove(effective_key);
        }
    }

    // == Invalidate ==
    /// Removes the cache entry for a key, forcing the next `run` to refetch.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.invalidate(key)
    }

    // == Clear ==
    /// Removes all cached entries, e.g. on logout.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    // == Stats ==
    /// Returns a snapshot of the underlying store's statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    // == Store ==
    /// Returns a handle to the shared store for direct access (sweeping,
    /// diagnostics).
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.store)
    }
}
