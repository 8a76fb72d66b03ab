//! Key scheme: deterministic backend keys for tickets, shadows and fee buckets.
//!
//! | shape | format |
//! |---|---|
//! | origin ticket | `{chain}/{tx_hash}` |
//! | derived IBC-hop ticket | `{chain}-{source_channel}-{sequence}` |
//! | shadow | `shadow{key}` |
//! | pool fee bucket | `pool/{pool_id}/{unix_secs}` |
//! | cached chain snapshot | `pools`, `params`, `supply`, `node_info` |
//!
//! Only origin keys are ever parsed back; derived keys are ambiguous
//! (chain ids and channel ids both contain `-`) and are only built.

use std::fmt;

use crate::error::ValidationError;

/// Prefix of every shadow key.
pub const SHADOW_PREFIX: &str = "shadow";

/// First segment of every pool fee bucket key.
pub const POOL_PREFIX: &str = "pool";

const ORIGIN_DELIMITER: char = '/';

/// Key of an origin ticket: the source chain plus the transaction hash.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OriginKey {
    chain: String,
    tx_hash: String,
}

impl OriginKey {
    /// Build an origin key. Neither component may be empty or contain `/`.
    pub fn new(chain: impl Into<String>, tx_hash: impl Into<String>) -> Result<Self, ValidationError> {
        let chain = chain.into();
        let tx_hash = tx_hash.into();
        check_component("chain", &chain)?;
        check_component("tx_hash", &tx_hash)?;
        Ok(Self { chain, tx_hash })
    }

    /// Parse a stored origin key back into its components.
    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = key.split(ORIGIN_DELIMITER).collect();
        match parts.as_slice() {
            [chain, tx_hash] if !chain.is_empty() && !tx_hash.is_empty() => Ok(Self {
                chain: chain.to_string(),
                tx_hash: tx_hash.to_string(),
            }),
            _ => Err(ValidationError::MalformedKey(key.to_string())),
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }
}

impl fmt::Display for OriginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.chain, ORIGIN_DELIMITER, self.tx_hash)
    }
}

impl fmt::Debug for OriginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OriginKey({})", self)
    }
}

fn check_component(component: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyComponent(component));
    }
    if value.contains(ORIGIN_DELIMITER) {
        return Err(ValidationError::ForbiddenChar {
            component,
            forbidden: ORIGIN_DELIMITER,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Key of a derived ticket, tracking a relayed packet by the chain it was
/// sent to, the channel it left on, and its send sequence.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PacketKey {
    chain: String,
    source_channel: String,
    sequence: u64,
}

impl PacketKey {
    pub fn new(chain: impl Into<String>, source_channel: impl Into<String>, sequence: u64) -> Self {
        Self {
            chain: chain.into(),
            source_channel: source_channel.into(),
            sequence,
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn source_channel(&self) -> &str {
        &self.source_channel
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for PacketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.chain, self.source_channel, self.sequence)
    }
}

impl fmt::Debug for PacketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PacketKey({})", self)
    }
}

/// Any key a ticket can live under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketKey {
    Origin(OriginKey),
    Packet(PacketKey),
}

impl TicketKey {
    /// The shadow key paired with this ticket key.
    pub fn shadow(&self) -> ShadowKey {
        ShadowKey(format!("{}{}", SHADOW_PREFIX, self))
    }

    pub fn as_origin(&self) -> Option<&OriginKey> {
        match self {
            TicketKey::Origin(key) => Some(key),
            TicketKey::Packet(_) => None,
        }
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketKey::Origin(key) => key.fmt(f),
            TicketKey::Packet(key) => key.fmt(f),
        }
    }
}

impl From<OriginKey> for TicketKey {
    fn from(key: OriginKey) -> Self {
        TicketKey::Origin(key)
    }
}

impl From<PacketKey> for TicketKey {
    fn from(key: PacketKey) -> Self {
        TicketKey::Packet(key)
    }
}

impl From<&OriginKey> for TicketKey {
    fn from(key: &OriginKey) -> Self {
        TicketKey::Origin(key.clone())
    }
}

impl From<&PacketKey> for TicketKey {
    fn from(key: &PacketKey) -> Self {
        TicketKey::Packet(key.clone())
    }
}

/// Short-lived sentinel marking an in-flight transition on a ticket key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShadowKey(String);

impl ShadowKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShadowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time bucket holding swap fees collected by one pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolFeeKey {
    pool_id: String,
    timestamp: u64,
}

impl PoolFeeKey {
    pub fn new(pool_id: impl Into<String>, timestamp: u64) -> Self {
        Self {
            pool_id: pool_id.into(),
            timestamp,
        }
    }

    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    /// Unix seconds of the bucket.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl fmt::Display for PoolFeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", POOL_PREFIX, self.pool_id, self.timestamp)
    }
}

/// Glob pattern matching every fee bucket of a pool.
pub fn pool_fee_pattern(pool_id: &str) -> String {
    format!("{}/{}/*", POOL_PREFIX, pool_id)
}

/// Chain snapshots other services write to fixed keys; read back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedEntry {
    Pools,
    Params,
    Supply,
    NodeInfo,
}

impl CachedEntry {
    pub const ALL: [CachedEntry; 4] = [
        CachedEntry::Pools,
        CachedEntry::Params,
        CachedEntry::Supply,
        CachedEntry::NodeInfo,
    ];

    /// Backend key the snapshot lives under.
    pub fn key(&self) -> &'static str {
        match self {
            CachedEntry::Pools => "pools",
            CachedEntry::Params => "params",
            CachedEntry::Supply => "supply",
            CachedEntry::NodeInfo => "node_info",
        }
    }
}

impl fmt::Display for CachedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CachedEntry::Pools => "pools",
            CachedEntry::Params => "params",
            CachedEntry::Supply => "total supply",
            CachedEntry::NodeInfo => "node info",
        })
    }
}
