//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// The value is stored type-erased as JSON; callers are responsible for
/// reading each key back as the same shape they wrote (see `QueryCache::run`).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Optional time-to-live; None means the entry never expires
    pub fn new(value: Value, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl.map(|ttl| now + ttl.as_millis() as u64);

        Self {
            value,
            stored_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: An entry is considered expired when the current time
    /// is greater than or equal to the expiration time. This ensures that once
    /// the TTL duration has fully elapsed, the entry is immediately expired.
    ///
    /// # Returns
    /// - `true` if the entry has a TTL and the current time >= expiration time
    /// - `false` if the entry has no TTL (never expires) or TTL hasn't elapsed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            if expires > now {
                Duration::from_millis(expires - now)
            } else {
                Duration::ZERO
            }
        })
    }

    // == Metadata ==
    /// Returns a diagnostics snapshot of this entry's timestamps.
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            stored_at: datetime_from_ms(self.stored_at),
            expires_at: self.expires_at.map(datetime_from_ms),
            ttl_remaining: self.ttl_remaining(),
        }
    }
}

// == Entry Metadata ==
/// Human-readable timestamps for a cache entry, used for diagnostics.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    /// When the entry was inserted
    pub stored_at: DateTime<Utc>,
    /// When the entry expires, None = never
    pub expires_at: Option<DateTime<Utc>>,
    /// Remaining time before expiration, None = never expires
    pub ttl_remaining: Option<Duration>,
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// Converts a Unix millisecond timestamp to a UTC datetime.
fn datetime_from_ms(ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_else(Utc::now)
}
