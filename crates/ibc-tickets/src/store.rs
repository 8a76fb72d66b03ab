//! The ticket store: create, read and transition tickets.
//!
//! Every transition is a handful of single-key backend writes (ticket,
//! shadow key, owner index) issued in a fixed order. Nothing is atomic
//! across them. When a sequence is cut short the shadow key is left to
//! expire, which is the signal an external reconciler acts on.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use ibc_tickets_backend::{KeyTtl, KeyValueBackend};
use ibc_tickets_core::{
    decode_ticket, encode_ticket, CachedEntry, Coins, OriginKey, OwnerId, PacketKey, PoolFeeKey, Ticket,
    TicketKey, TicketStatus, TxHashEntry, ValidationError,
};
use tracing::{debug, field, instrument, warn, Span};

use crate::bounded::BoundedBackend;
use crate::config::{Expiry, StoreConfig};
use crate::error::{Result, TicketStoreError};
use crate::fees::FeeLedger;
use crate::index::OwnerIndex;

/// One outbound IBC packet sent on behalf of an origin ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitHop {
    /// Chain the packet is addressed to.
    pub dest_chain: String,
    pub source_channel: String,
    /// Send-packet sequence number.
    pub sequence: u64,
    /// Transaction that sent the packet.
    pub tx_hash: String,
    /// Chain the sending transaction landed on.
    pub chain_name: String,
    pub height: i64,
}

impl TransitHop {
    /// Key of the derived ticket tracking this packet.
    pub fn packet_key(&self) -> PacketKey {
        PacketKey::new(self.dest_chain.clone(), self.source_channel.clone(), self.sequence)
    }
}

/// TTL-governed store of transfer tickets.
///
/// Holds no locks of its own; share it behind an `Arc`.
pub struct TicketStore<B: ?Sized> {
    backend: BoundedBackend<B>,
    index: OwnerIndex<B>,
    fees: FeeLedger<B>,
    config: StoreConfig,
}

impl<B: KeyValueBackend> TicketStore<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self::from_arc(Arc::new(backend), config)
    }
}

impl<B: KeyValueBackend + ?Sized> TicketStore<B> {
    /// Build a store over a backend that is shared elsewhere.
    pub fn from_arc(backend: Arc<B>, config: StoreConfig) -> Self {
        let backend = BoundedBackend::new(backend, config.request_timeout, config.scan_count);
        Self {
            index: OwnerIndex::new(backend.clone()),
            fees: FeeLedger::new(backend.clone(), config.clone()),
            backend,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<B> {
        self.backend.inner()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch and decode the ticket under `key`.
    #[instrument(level = "debug", skip_all, fields(key = field::Empty), err)]
    pub async fn get(&self, key: impl Into<TicketKey>) -> Result<Ticket> {
        let key = key.into();
        Span::current().record("key", field::display(&key));
        self.read(&key.to_string()).await
    }

    /// Whether a live ticket exists under `key`.
    pub async fn exists(&self, key: impl Into<TicketKey>) -> Result<bool> {
        self.backend.exists(&key.into().to_string()).await
    }

    /// Whether the shadow key of `key` is still live, i.e. the last
    /// transition that opened it has not reached a terminal write yet.
    pub async fn shadow_pending(&self, key: impl Into<TicketKey>) -> Result<bool> {
        self.backend.exists(key.into().shadow().as_str()).await
    }

    /// Remaining lifetime of the ticket under `key`.
    pub async fn expiry(&self, key: impl Into<TicketKey>) -> Result<KeyTtl> {
        self.backend.ttl(&key.into().to_string()).await
    }

    /// Outstanding origin tickets of an owner, tx hashes grouped by chain.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn user_tickets(&self, owner: impl AsRef<[u8]>) -> Result<BTreeMap<String, Vec<String>>> {
        let owner = OwnerId::from_identity(owner);
        self.index.by_chain(&owner).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Origin Ticket Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a pending ticket for `chain/tx_hash` owned by `owner`.
    ///
    /// The ticket persists until a transition rewrites it. A live ticket
    /// under the same key is overwritten.
    #[instrument(level = "debug", skip_all, fields(chain = chain, tx_hash = tx_hash), err)]
    pub async fn create(&self, chain: &str, tx_hash: &str, owner: impl AsRef<[u8]>) -> Result<OriginKey> {
        let owner = owner.as_ref();
        if owner.is_empty() {
            return Err(ValidationError::EmptyComponent("owner").into());
        }
        let key = OriginKey::new(chain, tx_hash)?;
        let owner = OwnerId::from_identity(owner);
        let ticket_key = TicketKey::from(&key);

        if self.backend.exists(&key.to_string()).await? {
            warn!(%key, "overwriting live ticket");
        }

        self.open_shadow(&ticket_key).await?;
        self.write(&ticket_key, &Ticket::pending(owner.clone()), Expiry::PENDING)
            .await?;
        self.index.add(&owner, &key).await?;

        debug!(%key, %owner, "ticket created");
        Ok(key)
    }

    /// Mark the transfer complete.
    #[instrument(level = "debug", skip_all, fields(key = %key, height = height), err)]
    pub async fn complete(&self, key: &OriginKey, height: i64) -> Result<()> {
        let prev = self.read(&key.to_string()).await?;
        let next = Ticket::rewrite(TicketStatus::Complete, Vec::new(), height);
        self.settle(key, &next, prev.owner.as_ref()).await
    }

    /// Record that the packet was not received on the destination chain.
    ///
    /// The ticket persists and stays indexed; the refreshed shadow key marks
    /// it for follow-up.
    #[instrument(level = "debug", skip_all, fields(key = %key, height = height), err)]
    pub async fn ibc_receive_failed(&self, key: &OriginKey, tx_hashes: Vec<TxHashEntry>, height: i64) -> Result<()> {
        let next = Ticket::rewrite(TicketStatus::IbcReceiveFailed, tx_hashes, height);
        self.settle(key, &next, None).await
    }

    /// Record that the packet was received on the destination chain.
    #[instrument(level = "debug", skip_all, fields(key = %key, height = height), err)]
    pub async fn ibc_receive_success(
        &self,
        key: &OriginKey,
        owner: Option<&OwnerId>,
        tx_hashes: Vec<TxHashEntry>,
        height: i64,
    ) -> Result<()> {
        let next = Ticket::rewrite(TicketStatus::IbcReceiveSuccess, tx_hashes, height);
        self.settle(key, &next, owner).await
    }

    /// Record that escrowed tokens were refunded after a packet timeout.
    #[instrument(level = "debug", skip_all, fields(key = %key, height = height), err)]
    pub async fn unlock_timeout(
        &self,
        key: &OriginKey,
        owner: Option<&OwnerId>,
        tx_hashes: Vec<TxHashEntry>,
        height: i64,
    ) -> Result<()> {
        let next = Ticket::rewrite(TicketStatus::TokensUnlockedTimeout, tx_hashes, height);
        self.settle(key, &next, owner).await
    }

    /// Record that escrowed tokens were refunded after an error acknowledgement.
    #[instrument(level = "debug", skip_all, fields(key = %key, height = height), err)]
    pub async fn unlock_ack(
        &self,
        key: &OriginKey,
        owner: Option<&OwnerId>,
        tx_hashes: Vec<TxHashEntry>,
        height: i64,
    ) -> Result<()> {
        let next = Ticket::rewrite(TicketStatus::TokensUnlockedAck, tx_hashes, height);
        self.settle(key, &next, owner).await
    }

    /// Mark the transfer failed with a diagnostic.
    #[instrument(level = "debug", skip_all, fields(key = %key, height = height), err)]
    pub async fn fail_with_error(&self, key: &OriginKey, error: &str, height: i64) -> Result<()> {
        let prev = self.read(&key.to_string()).await?;
        self.settle(key, &Ticket::failed(error, height), prev.owner.as_ref())
            .await
    }

    /// Mark the origin ticket in transit and open a derived ticket for the
    /// outbound packet. Returns the derived key.
    #[instrument(
        level = "debug",
        skip_all,
        fields(key = %key, packet = field::Empty, height = hop.height),
        err
    )]
    pub async fn mark_in_transit(&self, key: &OriginKey, hop: &TransitHop) -> Result<PacketKey> {
        let origin_key = TicketKey::from(key);
        let mut origin = self.read(&key.to_string()).await?;

        self.open_shadow(&origin_key).await?;

        origin.status = TicketStatus::Transit;
        origin.height = hop.height;
        self.write(&origin_key, &origin, Expiry::EXTENDED).await?;

        let packet = hop.packet_key();
        Span::current().record("packet", field::display(&packet));
        let first_hop = TxHashEntry::new(hop.chain_name.clone(), TicketStatus::Transit, hop.tx_hash.clone());
        let derived = Ticket::derived(key.clone(), origin.owner, first_hop, hop.height);
        self.write(&TicketKey::from(&packet), &derived, Expiry::EXTENDED)
            .await?;

        debug!(%key, %packet, "ticket in transit");
        Ok(packet)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived Ticket Chases
    // ─────────────────────────────────────────────────────────────────────────

    /// The packet timed out and escrow was refunded.
    #[instrument(level = "debug", skip_all, fields(packet = %packet, height = height), err)]
    pub async fn ibc_timeout_unlock(&self, packet: &PacketKey, tx_hash: &str, chain_name: &str, height: i64) -> Result<()> {
        let chase = self
            .chase(packet, TicketStatus::TokensUnlockedTimeout, tx_hash, chain_name)
            .await?;
        self.unlock_timeout(&chase.origin, chase.owner.as_ref(), chase.trail, height)
            .await
    }

    /// The packet was acknowledged with an error and escrow was refunded.
    #[instrument(level = "debug", skip_all, fields(packet = %packet, height = height), err)]
    pub async fn ibc_ack_unlock(&self, packet: &PacketKey, tx_hash: &str, chain_name: &str, height: i64) -> Result<()> {
        let chase = self
            .chase(packet, TicketStatus::TokensUnlockedAck, tx_hash, chain_name)
            .await?;
        self.unlock_ack(&chase.origin, chase.owner.as_ref(), chase.trail, height)
            .await
    }

    /// The packet was received on the destination chain.
    #[instrument(level = "debug", skip_all, fields(packet = %packet, height = height), err)]
    pub async fn ibc_received(&self, packet: &PacketKey, tx_hash: &str, chain_name: &str, height: i64) -> Result<()> {
        let chase = self
            .chase(packet, TicketStatus::IbcReceiveSuccess, tx_hash, chain_name)
            .await?;
        self.ibc_receive_success(&chase.origin, chase.owner.as_ref(), chase.trail, height)
            .await
    }

    /// The packet failed on the destination chain.
    #[instrument(level = "debug", skip_all, fields(packet = %packet, height = height), err)]
    pub async fn ibc_failed(&self, packet: &PacketKey, tx_hash: &str, chain_name: &str, height: i64) -> Result<()> {
        let chase = self
            .chase(packet, TicketStatus::IbcReceiveFailed, tx_hash, chain_name)
            .await?;
        self.ibc_receive_failed(&chase.origin, chase.trail, height).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove a ticket, its shadow key and, for origin tickets, its owner
    /// index entry. Returns whether a ticket was present.
    #[instrument(level = "debug", skip_all, fields(key = field::Empty), err)]
    pub async fn delete(&self, key: impl Into<TicketKey>) -> Result<bool> {
        let key = key.into();
        let raw = key.to_string();
        Span::current().record("key", field::display(&key));

        let prev = match self.read(&raw).await {
            Ok(ticket) => Some(ticket),
            Err(TicketStoreError::NotFound { .. }) => None,
            Err(TicketStoreError::Decode { .. }) => {
                warn!(key = %raw, "deleting undecodable ticket");
                None
            }
            Err(e) => return Err(e),
        };

        let removed = self.backend.delete(&raw).await?;
        self.close_shadow(&key).await?;
        if let (Some(origin), Some(prev)) = (key.as_origin(), prev) {
            self.unindex(prev.owner.as_ref(), origin).await?;
        }

        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pool Fees
    // ─────────────────────────────────────────────────────────────────────────

    /// Record a swap fee collected by a pool, e.g. `("1", "100", "uatom")`.
    #[instrument(level = "debug", skip_all, fields(pool_id = pool_id), err)]
    pub async fn record_swap_fee(&self, pool_id: &str, amount: &str, denom: &str) -> Result<PoolFeeKey> {
        self.fees.record_swap_fee(pool_id, amount, denom).await
    }

    /// Record a swap fee in the bucket of an explicit unix second.
    #[instrument(level = "debug", skip_all, fields(pool_id = pool_id, timestamp = timestamp), err)]
    pub async fn record_swap_fee_at(&self, pool_id: &str, amount: &str, denom: &str, timestamp: u64) -> Result<PoolFeeKey> {
        self.fees
            .record_swap_fee_at(pool_id, amount, denom, timestamp)
            .await
    }

    /// Fees collected by a pool over the live buckets, summed per denomination.
    #[instrument(level = "debug", skip_all, fields(pool_id = pool_id), err)]
    pub async fn swap_fees(&self, pool_id: &str) -> Result<Coins> {
        self.fees.swap_fees(pool_id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cached Chain Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Raw liquidity pool listing.
    pub async fn pools(&self) -> Result<Bytes> {
        self.cached(CachedEntry::Pools).await
    }

    /// Raw chain parameters.
    pub async fn params(&self) -> Result<Bytes> {
        self.cached(CachedEntry::Params).await
    }

    /// Raw total supply.
    pub async fn supply(&self) -> Result<Bytes> {
        self.cached(CachedEntry::Supply).await
    }

    pub async fn node_info(&self) -> Result<Bytes> {
        self.cached(CachedEntry::NodeInfo).await
    }

    /// Bytes stored under a snapshot key, as written.
    #[instrument(level = "debug", skip_all, fields(key = entry.key()), err)]
    pub async fn cached(&self, entry: CachedEntry) -> Result<Bytes> {
        self.backend
            .get(entry.key())
            .await?
            .ok_or(TicketStoreError::CacheMiss(entry))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    async fn read(&self, key: &str) -> Result<Ticket> {
        let value = self
            .backend
            .get(key)
            .await?
            .ok_or_else(|| TicketStoreError::NotFound { key: key.to_string() })?;

        decode_ticket(&value).map_err(|source| TicketStoreError::Decode {
            key: key.to_string(),
            source,
        })
    }

    async fn write(&self, key: &TicketKey, ticket: &Ticket, expiry: Expiry) -> Result<()> {
        let raw = key.to_string();
        let value = encode_ticket(ticket).map_err(|source| TicketStoreError::Decode {
            key: raw.clone(),
            source,
        })?;
        self.backend
            .set(&raw, Bytes::from(value), self.config.ttl(expiry))
            .await?;
        debug!(key = %raw, status = %ticket.status, "ticket written");
        Ok(())
    }

    async fn open_shadow(&self, key: &TicketKey) -> Result<()> {
        let shadow = key.shadow();
        self.backend
            .set(shadow.as_str(), Bytes::new(), self.config.ttl(Expiry::SHADOW))
            .await
    }

    async fn close_shadow(&self, key: &TicketKey) -> Result<()> {
        self.backend.delete(key.shadow().as_str()).await?;
        Ok(())
    }

    async fn unindex(&self, owner: Option<&OwnerId>, key: &OriginKey) -> Result<()> {
        match owner {
            Some(owner) => self.index.remove(owner, key).await,
            None => {
                debug!(%key, "no owner recorded, index untouched");
                Ok(())
            }
        }
    }

    /// Write a rewrite of an origin ticket.
    ///
    /// A terminal status expires after the extended lifetime, drops the
    /// shadow key and unindexes `owner`. Anything else persists behind a
    /// refreshed shadow key and keeps its index entry.
    async fn settle(&self, key: &OriginKey, next: &Ticket, owner: Option<&OwnerId>) -> Result<()> {
        let ticket_key = TicketKey::from(key);
        if !next.status.is_terminal() {
            self.open_shadow(&ticket_key).await?;
            return self.write(&ticket_key, next, Expiry::PENDING).await;
        }

        self.write(&ticket_key, next, Expiry::EXTENDED).await?;
        self.close_shadow(&ticket_key).await?;
        self.unindex(owner, key).await
    }

    /// Resolve a derived ticket to its origin and extend its trail.
    async fn chase(&self, packet: &PacketKey, status: TicketStatus, tx_hash: &str, chain_name: &str) -> Result<Chase> {
        let raw = packet.to_string();
        let derived = self.read(&raw).await?;
        let origin = derived
            .origin()
            .cloned()
            .ok_or(TicketStoreError::NotDerived { key: raw })?;
        let trail = derived.trail_with(TxHashEntry::new(chain_name, status, tx_hash));

        Ok(Chase {
            origin,
            owner: derived.owner,
            trail,
        })
    }
}

struct Chase {
    origin: OriginKey,
    owner: Option<OwnerId>,
    trail: Vec<TxHashEntry>,
}
