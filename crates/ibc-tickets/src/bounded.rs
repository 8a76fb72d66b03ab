//! Backend access bounded by the request timeout.
//!
//! Every call the store makes goes through [`BoundedBackend`], which applies
//! `StoreConfig::request_timeout` and attaches the operation name and key to
//! any failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use ibc_tickets_backend::{BackendError, KeyTtl, KeyValueBackend};
use tracing::trace;

use crate::error::{Result, TicketStoreError};

pub(crate) struct BoundedBackend<B: ?Sized> {
    inner: Arc<B>,
    timeout: Duration,
    scan_count: usize,
}

impl<B: ?Sized> Clone for BoundedBackend<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
            scan_count: self.scan_count,
        }
    }
}

impl<B: KeyValueBackend + ?Sized> BoundedBackend<B> {
    pub(crate) fn new(inner: Arc<B>, timeout: Duration, scan_count: usize) -> Self {
        Self {
            inner,
            timeout,
            scan_count: scan_count.max(1),
        }
    }

    pub(crate) fn inner(&self) -> &Arc<B> {
        &self.inner
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.bounded("GET", key, self.inner.get(key)).await
    }

    pub(crate) async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        self.bounded("SET", key, self.inner.set(key, value, ttl)).await
    }

    pub(crate) async fn delete(&self, key: &str) -> Result<bool> {
        self.bounded("DEL", key, self.inner.delete(key)).await
    }

    pub(crate) async fn exists(&self, key: &str) -> Result<bool> {
        self.bounded("EXISTS", key, self.inner.exists(key)).await
    }

    pub(crate) async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        self.bounded("TTL", key, self.inner.ttl(key)).await
    }

    pub(crate) async fn set_add(&self, set: &str, member: &str) -> Result<bool> {
        self.bounded("SADD", set, self.inner.set_add(set, member)).await
    }

    pub(crate) async fn set_remove(&self, set: &str, member: &str) -> Result<bool> {
        self.bounded("SREM", set, self.inner.set_remove(set, member)).await
    }

    pub(crate) async fn set_members(&self, set: &str) -> Result<Vec<String>> {
        self.bounded("SMEMBERS", set, self.inner.set_members(set)).await
    }

    /// Scan until the cursor returns to zero. Each page is bounded on its own.
    pub(crate) async fn scan_all(&self, pattern: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor = 0;

        loop {
            let page = self
                .bounded("SCAN", pattern, self.inner.scan(cursor, pattern, self.scan_count))
                .await?;
            trace!(pattern, cursor, found = page.keys.len(), "scan page");
            keys.extend(page.keys);
            if page.cursor == 0 {
                break;
            }
            cursor = page.cursor;
        }

        Ok(keys)
    }

    async fn bounded<T, F>(&self, op: &'static str, key: &str, call: F) -> Result<T>
    where
        F: Future<Output = ibc_tickets_backend::Result<T>>,
    {
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };

        outcome.map_err(|source| TicketStoreError::Backend {
            op,
            key: key.to_string(),
            source,
        })
    }
}
