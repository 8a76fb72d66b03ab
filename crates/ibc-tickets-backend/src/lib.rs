//! # IBC Tickets Backend
//!
//! Key-value backend abstraction for the ticket store. Provides a trait-based
//! interface over a TTL-capable key-value system with an unordered string-set
//! collection, plus three implementations.
//!
//! ## Overview
//!
//! The ticket store never talks to a database directly. It needs exactly the
//! primitives of [`KeyValueBackend`]: `get`, `set` with optional expiry,
//! `delete`, `exists`, cursor `scan` by glob pattern, and `set_add` /
//! `set_remove` / `set_members`. Each call is atomic on its own key; nothing
//! is atomic across keys.
//!
//! ## Key Types
//!
//! - [`KeyValueBackend`] - The async trait for all backend operations
//! - [`RedisBackend`] - Redis, the production backend
//! - [`SqliteBackend`] - Embedded persistent backend
//! - [`MemoryBackend`] - In-memory backend for tests
//! - [`KeyTtl`] / [`ScanPage`] - Results of `ttl` and `scan`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use bytes::Bytes;
//! use ibc_tickets_backend::{KeyValueBackend, MemoryBackend};
//!
//! async fn example() {
//!     let backend = MemoryBackend::new();
//!
//!     // Write with a five minute expiry
//!     backend
//!         .set("shadowcosmoshub/ABC", Bytes::new(), Some(Duration::from_secs(300)))
//!         .await
//!         .unwrap();
//!
//!     // Index a key under its owner
//!     backend.set_add("6164647231", "cosmoshub/ABC").await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Expiry**: `None` persists the key; `Some(d)` expires it after `d`.
//!   Every `set` replaces the previous expiry.
//! - **Scan**: cursor based, `0` starts and `0` ends an iteration. Keys added
//!   or removed during an iteration may or may not be reported.
//! - **Sets**: an empty set does not exist; removing an absent member is not an error.

pub mod error;
pub mod glob;
pub mod memory;
pub mod migration;
pub mod redis;
pub mod sqlite;
pub mod traits;

pub use error::{BackendError, Result};
pub use memory::MemoryBackend;
pub use crate::redis::RedisBackend;
pub use sqlite::SqliteBackend;
pub use traits::{KeyTtl, KeyValueBackend, ScanPage};
