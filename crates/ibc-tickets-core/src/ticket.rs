//! Ticket: the persisted state record of one cross-chain transfer.
//!
//! An origin ticket is keyed by the source transaction. Once the packet is
//! on its way, a derived ticket keyed by the packet identity is written that
//! links back to the origin, so packet-level updates can find the ticket the
//! owner actually queries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;
use crate::keys::OriginKey;
use crate::types::OwnerId;

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "transit")]
    Transit,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "IBC_receive_failed")]
    IbcReceiveFailed,
    #[serde(rename = "IBC_receive_success")]
    IbcReceiveSuccess,
    #[serde(rename = "Tokens_unlocked_timeout")]
    TokensUnlockedTimeout,
    #[serde(rename = "Tokens_unlocked_ack")]
    TokensUnlockedAck,
}

impl TicketStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [TicketStatus; 8] = [
        TicketStatus::Pending,
        TicketStatus::Transit,
        TicketStatus::Complete,
        TicketStatus::Failed,
        TicketStatus::IbcReceiveFailed,
        TicketStatus::IbcReceiveSuccess,
        TicketStatus::TokensUnlockedTimeout,
        TicketStatus::TokensUnlockedAck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Transit => "transit",
            TicketStatus::Complete => "complete",
            TicketStatus::Failed => "failed",
            TicketStatus::IbcReceiveFailed => "IBC_receive_failed",
            TicketStatus::IbcReceiveSuccess => "IBC_receive_success",
            TicketStatus::TokensUnlockedTimeout => "Tokens_unlocked_timeout",
            TicketStatus::TokensUnlockedAck => "Tokens_unlocked_ack",
        }
    }

    /// Whether writing this status ends active tracking of the key it is
    /// written to: the shadow key is dropped and the owner-index entry removed.
    ///
    /// `IBC_receive_failed` is not terminal: the transfer may still be refunded.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TicketStatus::Complete
                | TicketStatus::Failed
                | TicketStatus::IbcReceiveSuccess
                | TicketStatus::TokensUnlockedTimeout
                | TicketStatus::TokensUnlockedAck
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CodecError::Malformed(format!("unknown ticket status {:?}", s)))
    }
}

/// One hop of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxHashEntry {
    pub chain: String,
    pub status: TicketStatus,
    pub tx_hash: String,
}

impl TxHashEntry {
    pub fn new(chain: impl Into<String>, status: TicketStatus, tx_hash: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            status,
            tx_hash: tx_hash.into(),
        }
    }
}

/// Relationship of a ticket to the transfer it tracks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TicketLink {
    /// Keyed by the source transaction itself.
    #[default]
    Origin,
    /// Keyed by packet identity; updates are applied to `origin`.
    Derived { origin: OriginKey },
}

/// The persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTicket", into = "WireTicket")]
pub struct Ticket {
    /// Owner recorded at creation. Terminal rewrites drop it.
    pub owner: Option<OwnerId>,
    pub link: TicketLink,
    /// Last chain height at which the ticket was updated; 0 when unknown.
    pub height: i64,
    pub status: TicketStatus,
    /// Append-only audit trail.
    pub tx_hashes: Vec<TxHashEntry>,
    /// Set only on `failed`.
    pub error: Option<String>,
}

impl Ticket {
    /// A freshly created origin ticket.
    pub fn pending(owner: OwnerId) -> Self {
        Self {
            owner: Some(owner),
            link: TicketLink::Origin,
            height: 0,
            status: TicketStatus::Pending,
            tx_hashes: Vec::new(),
            error: None,
        }
    }

    /// A derived ticket pointing back at `origin`.
    pub fn derived(origin: OriginKey, owner: Option<OwnerId>, first_hop: TxHashEntry, height: i64) -> Self {
        Self {
            owner,
            link: TicketLink::Derived { origin },
            height,
            status: first_hop.status,
            tx_hashes: vec![first_hop],
            error: None,
        }
    }

    /// A rewrite carrying only status, trail and height.
    pub fn rewrite(status: TicketStatus, tx_hashes: Vec<TxHashEntry>, height: i64) -> Self {
        Self {
            owner: None,
            link: TicketLink::Origin,
            height,
            status,
            tx_hashes,
            error: None,
        }
    }

    /// A `failed` rewrite with its diagnostic.
    pub fn failed(error: impl Into<String>, height: i64) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::rewrite(TicketStatus::Failed, Vec::new(), height)
        }
    }

    /// The origin key, if this is a derived ticket.
    pub fn origin(&self) -> Option<&OriginKey> {
        match &self.link {
            TicketLink::Origin => None,
            TicketLink::Derived { origin } => Some(origin),
        }
    }

    /// The accumulated trail plus one more hop.
    pub fn trail_with(&self, entry: TxHashEntry) -> Vec<TxHashEntry> {
        let mut trail = self.tx_hashes.clone();
        trail.push(entry);
        trail
    }
}

/// On-the-wire shape: every field but `status` omitted when empty.
#[derive(Serialize, Deserialize)]
struct WireTicket {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    info: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    height: i64,
    status: TicketStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tx_hashes: Vec<TxHashEntry>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    error: String,
}

fn is_zero(height: &i64) -> bool {
    *height == 0
}

impl From<Ticket> for WireTicket {
    fn from(t: Ticket) -> Self {
        Self {
            owner: t.owner.map(|o| o.as_str().to_string()).unwrap_or_default(),
            info: match t.link {
                TicketLink::Origin => String::new(),
                TicketLink::Derived { origin } => origin.to_string(),
            },
            height: t.height,
            status: t.status,
            tx_hashes: t.tx_hashes,
            error: t.error.unwrap_or_default(),
        }
    }
}

impl TryFrom<WireTicket> for Ticket {
    type Error = CodecError;

    fn try_from(w: WireTicket) -> Result<Self, Self::Error> {
        let owner = if w.owner.is_empty() {
            None
        } else {
            Some(OwnerId::from_hex(&w.owner).map_err(|e| CodecError::Malformed(e.to_string()))?)
        };

        let link = if w.info.is_empty() {
            TicketLink::Origin
        } else {
            TicketLink::Derived {
                origin: OriginKey::parse(&w.info).map_err(|e| CodecError::Malformed(e.to_string()))?,
            }
        };

        Ok(Self {
            owner,
            link,
            height: w.height,
            status: w.status,
            tx_hashes: w.tx_hashes,
            error: (!w.error.is_empty()).then_some(w.error),
        })
    }
}
