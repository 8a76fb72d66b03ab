//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Helpers panic on failure, which
//! is what a test wants.

use ibc_tickets::{OriginKey, PacketKey, StoreConfig, TicketStore, TransitHop};
use ibc_tickets_backend::MemoryBackend;

/// Default owner identity used by fixtures.
pub const DEFAULT_OWNER: &str = "cosmos1fixtureowner";

/// A ticket store over a fresh in-memory backend, plus an owner to act as.
pub struct TestFixture {
    pub store: TicketStore<MemoryBackend>,
    pub owner: String,
}

impl TestFixture {
    /// Create a fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            store: TicketStore::new(MemoryBackend::new(), config),
            owner: DEFAULT_OWNER.to_string(),
        }
    }

    /// Same backend settings, acting as another owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// The packet a fixture sends for sequence `seq`.
    pub fn hop(&self, chain: &str, tx_hash: &str, seq: u64) -> TransitHop {
        TransitHop {
            dest_chain: "osmosis-1".to_string(),
            source_channel: "channel-0".to_string(),
            sequence: seq,
            tx_hash: tx_hash.to_string(),
            chain_name: chain.to_string(),
            height: 100 + seq as i64,
        }
    }

    /// Create a pending ticket owned by the fixture owner.
    pub async fn pending(&self, chain: &str, tx_hash: &str) -> OriginKey {
        self.store
            .create(chain, tx_hash, self.owner.as_bytes())
            .await
            .expect("fixture create must succeed")
    }

    /// Create a ticket and put it in transit. Returns both keys.
    pub async fn in_transit(&self, chain: &str, tx_hash: &str, seq: u64) -> (OriginKey, PacketKey) {
        let origin = self.pending(chain, tx_hash).await;
        let packet = self
            .store
            .mark_in_transit(&origin, &self.hop(chain, tx_hash, seq))
            .await
            .expect("fixture transit must succeed");
        (origin, packet)
    }

    /// Number of outstanding tickets indexed under the fixture owner.
    pub async fn outstanding(&self) -> usize {
        self.store
            .user_tickets(self.owner.as_bytes())
            .await
            .expect("fixture index read must succeed")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Distinct owner identities for multi-owner tests.
pub fn owners(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("cosmos1owner{:03}", i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_tickets::TicketStatus;

    #[tokio::test]
    async fn test_fixture_in_transit() {
        let fixture = TestFixture::new();
        let (origin, packet) = fixture.in_transit("cosmoshub-4", "ABC", 3).await;

        assert_eq!(packet.to_string(), "osmosis-1-channel-0-3");
        assert_eq!(fixture.store.get(&origin).await.unwrap().status, TicketStatus::Transit);
        assert_eq!(fixture.store.get(&packet).await.unwrap().origin(), Some(&origin));
        assert_eq!(fixture.outstanding().await, 1);
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let names = owners(3);
        assert_eq!(names.len(), 3);
        assert_ne!(names[0], names[1]);

        let fixture = TestFixture::new().with_owner(names[0].clone());
        fixture.pending("cosmoshub-4", "A").await;
        fixture.pending("osmosis-1", "B").await;
        assert_eq!(fixture.outstanding().await, 2);

        let other = fixture.store.user_tickets(names[1].as_bytes()).await.unwrap();
        assert!(other.is_empty());
    }
}
