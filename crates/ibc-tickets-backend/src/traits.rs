//! Backend trait: the abstract interface over a TTL key-value system.
//!
//! This trait allows the ticket store to be backend-agnostic. Implementations
//! include Redis (production), SQLite (embedded) and in-memory (for tests).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist (or already expired).
    Missing,
    /// The key exists and never expires.
    Persistent,
    /// The key expires after the given duration.
    Expires(Duration),
}

impl KeyTtl {
    pub fn exists(&self) -> bool {
        !matches!(self, KeyTtl::Missing)
    }
}

/// One page of a cursor scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` when the iteration is complete.
    pub cursor: u64,
    /// Keys matching the pattern found in this page. May be empty even when
    /// the iteration is not complete.
    pub keys: Vec<String>,
}

/// The backend trait: async interface over a TTL key-value store.
///
/// # Design Notes
///
/// - **Per-key atomicity**: every method is atomic for the key it touches.
///   There is no multi-key transaction.
/// - **Expiry replaces**: `set` always replaces the previous expiry, so a
///   `set(.., None)` makes a previously expiring key persistent.
/// - **Absent is not an error**: `get` returns `None`, `delete` and
///   `set_remove` report `false`.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Key Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the value of a live key.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Set a key, with `ttl = None` meaning "persist".
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()>;

    /// Delete a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check whether a live key exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remaining lifetime of a key.
    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Walk the keyspace. Examines about `count` keys starting at `cursor` and
    /// returns those matching the glob `pattern`.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage>;

    // ─────────────────────────────────────────────────────────────────────────
    // Set Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a member to a set. Returns whether it was newly added.
    async fn set_add(&self, set: &str, member: &str) -> Result<bool>;

    /// Remove a member from a set. Returns whether it was present.
    async fn set_remove(&self, set: &str, member: &str) -> Result<bool>;

    /// All members of a set, in no particular order.
    async fn set_members(&self, set: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
pub(crate) async fn collect_scan<B: KeyValueBackend + ?Sized>(
    backend: &B,
    pattern: &str,
    count: usize,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut cursor = 0;
    loop {
        let page = backend.scan(cursor, pattern, count).await?;
        keys.extend(page.keys);
        if page.cursor == 0 {
            return Ok(keys);
        }
        cursor = page.cursor;
    }
}
