//! # IBC Tickets Core
//!
//! Pure primitives for tracking cross-chain transfer tickets: the ticket
//! record, its status machine, the key scheme and the JSON wire codec.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Ticket`] - The persisted state record of one transfer
//! - [`TicketStatus`] - Lifecycle status, with [`TicketStatus::is_terminal`]
//! - [`TicketLink`] - Whether a ticket is an origin or a derived IBC-hop ticket
//! - [`OriginKey`] / [`PacketKey`] / [`TicketKey`] - The key scheme
//! - [`OwnerId`] - Hex-encoded owner identity, used as the owner-index set name
//! - [`Coin`] / [`Coins`] - Pool fee amounts
//!
//! ## Wire Format
//!
//! Tickets are stored as JSON objects. See [`codec`] module.

pub mod codec;
pub mod coin;
pub mod error;
pub mod keys;
pub mod ticket;
pub mod types;

pub use codec::{decode_ticket, encode_ticket};
pub use coin::{Coin, Coins};
pub use error::{CodecError, ValidationError};
pub use keys::{pool_fee_pattern, CachedEntry, OriginKey, PacketKey, PoolFeeKey, ShadowKey, TicketKey};
pub use ticket::{Ticket, TicketLink, TicketStatus, TxHashEntry};
pub use types::OwnerId;
