//! In-memory implementation of the KeyValueBackend trait.
//!
//! This is primarily for testing. It follows the same semantics as Redis
//! but keeps everything in memory with no persistence. Expiry is measured
//! with `tokio::time::Instant`, so tests can drive it with paused time.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use crate::error::{BackendError, Result};
use crate::glob::glob_match;
use crate::traits::{KeyTtl, KeyValueBackend, ScanPage};

/// In-memory backend implementation.
///
/// All data is lost when the backend is dropped. Thread-safe via RwLock.
pub struct MemoryBackend {
    inner: RwLock<MemoryBackendInner>,
}

struct MemoryBackendInner {
    /// Plain keys, ordered so scan cursors are stable offsets.
    entries: BTreeMap<String, Entry>,

    /// Unordered string sets.
    sets: HashMap<String, BTreeSet<String>>,
}

struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryBackendInner {
                entries: BTreeMap::new(),
                sets: HashMap::new(),
            }),
        }
    }

    /// Number of live keys (sets excluded).
    pub fn len(&self) -> Result<usize> {
        let now = Instant::now();
        Ok(self.read()?.entries.values().filter(|e| e.is_live(now)).count())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every expired key.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Instant::now();
        let mut inner = self.write()?;
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.is_live(now));
        Ok(before - inner.entries.len())
    }

    /// Remove everything, keys and sets.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.write()?;
        inner.entries.clear();
        inner.sets.clear();
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryBackendInner>> {
        self.inner
            .read()
            .map_err(|e| BackendError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryBackendInner>> {
        self.inner
            .write()
            .map_err(|e| BackendError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let now = Instant::now();
        let inner = self.read()?;
        Ok(inner
            .entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut inner = self.write()?;
        inner
            .entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let mut inner = self.write()?;
        Ok(inner
            .entries
            .remove(key)
            .is_some_and(|e| e.is_live(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let inner = self.read()?;
        Ok(inner.entries.get(key).is_some_and(|e| e.is_live(now)))
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let now = Instant::now();
        let inner = self.read()?;
        Ok(match inner.entries.get(key).filter(|e| e.is_live(now)) {
            None => KeyTtl::Missing,
            Some(Entry { expires_at: None, .. }) => KeyTtl::Persistent,
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => KeyTtl::Expires(at.duration_since(now)),
        })
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let now = Instant::now();
        let inner = self.read()?;

        let start = cursor as usize;
        let count = count.max(1);
        let mut examined = 0;
        let mut keys = Vec::new();

        for (key, entry) in inner.entries.iter().skip(start).take(count) {
            examined += 1;
            if entry.is_live(now) && glob_match(pattern, key) {
                keys.push(key.clone());
            }
        }

        let next = start + examined;
        let cursor = if examined < count || next >= inner.entries.len() {
            0
        } else {
            next as u64
        };

        Ok(ScanPage { cursor, keys })
    }

    async fn set_add(&self, set: &str, member: &str) -> Result<bool> {
        let mut inner = self.write()?;
        Ok(inner
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_remove(&self, set: &str, member: &str) -> Result<bool> {
        let mut inner = self.write()?;
        let Some(members) = inner.sets.get_mut(set) else {
            return Ok(false);
        };
        let removed = members.remove(member);
        if members.is_empty() {
            inner.sets.remove(set);
        }
        Ok(removed)
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>> {
        let inner = self.read()?;
        Ok(inner
            .sets
            .get(set)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default())
    }
}
