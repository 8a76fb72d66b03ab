//! SQLite implementation of the KeyValueBackend trait.
//!
//! An embedded, persistent backend for single-node deployments and tests that
//! need data to survive a restart. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.
//!
//! Expiry is stored as an absolute Unix millisecond deadline and checked on
//! read; expired rows linger until [`SqliteBackend::purge_expired`] runs or the
//! key is written again.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{BackendError, Result};
use crate::glob::glob_match;
use crate::migration;
use crate::traits::{KeyTtl, KeyValueBackend, ScanPage};

/// Row predicate for keys that have not expired; `?2` is the current time.
const LIVE: &str = "(expires_at IS NULL OR expires_at > ?2)";

/// SQLite-based backend implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteBackend {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Delete every expired row. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.run(|conn| {
            let removed = conn.execute(
                "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![now_millis()],
            )?;
            Ok(removed)
        })
        .await
    }

    /// Execute a blocking operation on the connection.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| BackendError::Poisoned(format!("mutex poisoned: {}", e)))?;
            f(&*conn)
        })
        .await
        .map_err(|e| BackendError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

#[async_trait]
impl KeyValueBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let key = key.to_string();
        self.run(move |conn| {
            let value: Option<Vec<u8>> = conn
                .query_row(
                    &format!("SELECT value FROM kv WHERE key = ?1 AND {}", LIVE),
                    params![key, now_millis()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value.map(Bytes::from))
        })
        .await
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let key = key.to_string();
        self.run(move |conn| {
            let expires_at = ttl.map(|ttl| now_millis().saturating_add(ttl.as_millis() as i64));
            conn.execute(
                "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    expires_at = excluded.expires_at",
                params![key, &value[..], expires_at],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.run(move |conn| {
            let live = is_live(conn, &key)?;
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(live)
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.run(move |conn| is_live(conn, &key)).await
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let key = key.to_string();
        self.run(move |conn| {
            let now = now_millis();
            let row: Option<Option<i64>> = conn
                .query_row(
                    &format!("SELECT expires_at FROM kv WHERE key = ?1 AND {}", LIVE),
                    params![key, now],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(match row {
                None => KeyTtl::Missing,
                Some(None) => KeyTtl::Persistent,
                Some(Some(at)) => KeyTtl::Expires(Duration::from_millis((at - now).max(0) as u64)),
            })
        })
        .await
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let pattern = pattern.to_string();
        let count = count.max(1);
        self.run(move |conn| {
            let now = now_millis();
            let mut stmt = conn.prepare(
                "SELECT rowid, key, expires_at FROM kv
                 WHERE rowid > ?1
                 ORDER BY rowid
                 LIMIT ?2",
            )?;

            let rows: Vec<(i64, String, Option<i64>)> = stmt
                .query_map(params![cursor as i64, count as i64], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let next = match rows.last() {
                Some((rowid, _, _)) if rows.len() == count => *rowid as u64,
                _ => 0,
            };

            let keys = rows
                .into_iter()
                .filter(|(_, key, expires_at)| {
                    expires_at.map_or(true, |at| at > now) && glob_match(&pattern, key)
                })
                .map(|(_, key, _)| key)
                .collect();

            Ok(ScanPage { cursor: next, keys })
        })
        .await
    }

    async fn set_add(&self, set: &str, member: &str) -> Result<bool> {
        let set = set.to_string();
        let member = member.to_string();
        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO set_members (set_name, member, added_at) VALUES (?1, ?2, ?3)",
                params![set, member, now_millis()],
            )?;
            Ok(inserted == 1)
        })
        .await
    }

    async fn set_remove(&self, set: &str, member: &str) -> Result<bool> {
        let set = set.to_string();
        let member = member.to_string();
        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM set_members WHERE set_name = ?1 AND member = ?2",
                params![set, member],
            )?;
            Ok(removed == 1)
        })
        .await
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>> {
        let set = set.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare("SELECT member FROM set_members WHERE set_name = ?1")?;
            let members = stmt
                .query_map(params![set], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(members)
        })
        .await
    }
}

fn is_live(conn: &Connection, key: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM kv WHERE key = ?1 AND {}", LIVE),
            params![key, now_millis()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
