//! Store configuration and the expiry policy.

use std::time::Duration;

/// Configuration for the ticket store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base expiry unit. Every write expires after a multiple of it.
    pub expiry: Duration,
    /// Upper bound on a single backend call.
    pub request_timeout: Duration,
    /// `COUNT` hint passed to each scan page.
    pub scan_count: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(300),
            request_timeout: Duration::from_secs(5),
            scan_count: 100,
        }
    }
}

impl StoreConfig {
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_scan_count(mut self, count: usize) -> Self {
        self.scan_count = count.max(1);
        self
    }

    /// Concrete TTL for a write, `None` meaning "persist".
    pub fn ttl(&self, expiry: Expiry) -> Option<Duration> {
        match expiry {
            Expiry::Persist => None,
            Expiry::Multiple(n) => Some(self.expiry * n),
        }
    }
}

/// How long a write lives, in units of [`StoreConfig::expiry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Persist,
    Multiple(u32),
}

impl Expiry {
    /// Freshly created tickets and `IBC_receive_failed` rewrites.
    pub const PENDING: Expiry = Expiry::Persist;
    /// Shadow keys.
    pub const SHADOW: Expiry = Expiry::Multiple(1);
    /// Transit, derived and terminal writes.
    pub const EXTENDED: Expiry = Expiry::Multiple(2);
    /// Pool fee buckets, about an hour at the default base.
    pub const POOL: Expiry = Expiry::Multiple(12);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = StoreConfig::default();
        assert_eq!(config.ttl(Expiry::PENDING), None);
        assert_eq!(config.ttl(Expiry::SHADOW), Some(Duration::from_secs(300)));
        assert_eq!(config.ttl(Expiry::EXTENDED), Some(Duration::from_secs(600)));
        assert_eq!(config.ttl(Expiry::POOL), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::default()
            .with_expiry(Duration::from_secs(10))
            .with_request_timeout(Duration::from_millis(250))
            .with_scan_count(0);
        assert_eq!(config.ttl(Expiry::EXTENDED), Some(Duration::from_secs(20)));
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.scan_count, 1);
    }
}
