//! # IBC Tickets
//!
//! A TTL-governed store tracking the lifecycle of cross-chain transfer
//! tickets in an external key-value backend.
//!
//! ## Overview
//!
//! A ticket is created `pending` when a transfer is submitted, moves to
//! `transit` when its IBC packet is sent, and ends in one of the terminal
//! statuses once the packet is received, refunded, or the transfer fails.
//! Alongside each ticket the store keeps:
//!
//! - **Shadow keys**: short-lived sentinels opened by in-flight transitions and
//!   deleted by terminal ones. A shadow key that expires marks a ticket that
//!   needs reconciliation.
//! - **Owner index**: one set per owner of the origin keys still outstanding.
//! - **Fee buckets**: swap fees per pool in one-second buckets, summed on read.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ibc_tickets::{StoreConfig, TicketStore, TransitHop};
//! use ibc_tickets::backend::RedisBackend;
//!
//! async fn example() {
//!     let backend = RedisBackend::connect("redis://127.0.0.1:6379/0").await.unwrap();
//!     let store = TicketStore::new(backend, StoreConfig::default());
//!
//!     let key = store.create("cosmoshub-4", "A1B2C3", b"cosmos1owner").await.unwrap();
//!
//!     let hop = TransitHop {
//!         dest_chain: "osmosis-1".into(),
//!         source_channel: "channel-141".into(),
//!         sequence: 42,
//!         tx_hash: "A1B2C3".into(),
//!         chain_name: "cosmoshub-4".into(),
//!         height: 1_000,
//!     };
//!     let packet = store.mark_in_transit(&key, &hop).await.unwrap();
//!
//!     store.ibc_received(&packet, "D4E5F6", "osmosis-1", 2_000).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ibc_tickets::core` - Tickets, keys, wire codec, coins
//! - `ibc_tickets::backend` - Backend trait and the Redis, SQLite and memory backends

mod bounded;
pub mod config;
pub mod error;
mod fees;
mod index;
pub mod store;

// Re-export component crates
pub use ibc_tickets_backend as backend;
pub use ibc_tickets_core as core;

pub use config::{Expiry, StoreConfig};
pub use error::{Result, TicketStoreError};
pub use store::{TicketStore, TransitHop};

pub use ibc_tickets_core::{
    CachedEntry, Coin, Coins, OriginKey, OwnerId, PacketKey, PoolFeeKey, Ticket, TicketKey, TicketLink,
    TicketStatus, TxHashEntry,
};
