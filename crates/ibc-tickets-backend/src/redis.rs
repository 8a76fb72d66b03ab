//! Redis implementation of the KeyValueBackend trait.
//!
//! Commands are issued verbatim so the wire behaviour is exactly:
//! `SET key value [EX seconds]`, `GET`, `DEL`, `EXISTS`, `TTL`,
//! `SCAN cursor MATCH pattern COUNT n`, `SADD`, `SREM`, `SMEMBERS`.
//!
//! Redis rejects `EX 0`, so a persisted write omits `EX` altogether and a
//! sub-second expiry is rounded up to one second.

use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{Client, Cmd};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{BackendError, Result};
use crate::traits::{KeyTtl, KeyValueBackend, ScanPage};

/// Redis-backed implementation.
///
/// Holds a multiplexed [`ConnectionManager`] that reconnects on failure.
/// Cloning it is cheap, so each call works on its own handle.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect to a Redis server, e.g. `redis://127.0.0.1:6379/0`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        debug!(url, "connected to redis");
        Ok(Self { conn })
    }

    /// Wrap an existing connection manager.
    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    async fn query<T: ::redis::FromRedisValue>(&self, cmd: Cmd) -> Result<T> {
        let mut conn = self.conn.clone();
        Ok(cmd.query_async(&mut conn).await?)
    }
}

/// Seconds for `EX`; never zero.
fn expire_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut cmd = ::redis::cmd("GET");
        cmd.arg(key);
        let value: Option<Vec<u8>> = self.query(cmd).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let mut cmd = ::redis::cmd("SET");
        cmd.arg(key).arg(&value[..]);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(expire_secs(ttl));
        }
        self.query::<()>(cmd).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut cmd = ::redis::cmd("DEL");
        cmd.arg(key);
        let removed: u64 = self.query(cmd).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut cmd = ::redis::cmd("EXISTS");
        cmd.arg(key);
        let found: u64 = self.query(cmd).await?;
        Ok(found == 1)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut cmd = ::redis::cmd("TTL");
        cmd.arg(key);
        let secs: i64 = self.query(cmd).await?;
        match secs {
            -2 => Ok(KeyTtl::Missing),
            -1 => Ok(KeyTtl::Persistent),
            s if s >= 0 => Ok(KeyTtl::Expires(Duration::from_secs(s as u64))),
            s => Err(BackendError::Protocol(format!("unexpected TTL reply {}", s))),
        }
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let mut cmd = ::redis::cmd("SCAN");
        cmd.arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count.max(1));
        let (cursor, keys): (u64, Vec<String>) = self.query(cmd).await?;
        Ok(ScanPage { cursor, keys })
    }

    async fn set_add(&self, set: &str, member: &str) -> Result<bool> {
        let mut cmd = ::redis::cmd("SADD");
        cmd.arg(set).arg(member);
        let added: u64 = self.query(cmd).await?;
        Ok(added == 1)
    }

    async fn set_remove(&self, set: &str, member: &str) -> Result<bool> {
        let mut cmd = ::redis::cmd("SREM");
        cmd.arg(set).arg(member);
        let removed: u64 = self.query(cmd).await?;
        Ok(removed == 1)
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>> {
        let mut cmd = ::redis::cmd("SMEMBERS");
        cmd.arg(set);
        self.query(cmd).await
    }
}
