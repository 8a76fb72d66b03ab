//! # IBC Tickets Testkit
//!
//! Testing utilities for the ticket store.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Stored JSON for each ticket shape, byte for byte
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A store over the in-memory backend with lifecycle helpers
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the wire format shared with every other reader of the
//! backend:
//!
//! ```rust
//! use ibc_tickets_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, json) in verify_all_vectors() {
//!     assert!(ok, "{}: {}", name, json);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ibc_tickets_core::{decode_ticket, encode_ticket};
//! use ibc_tickets_testkit::generators::ticket;
//!
//! proptest! {
//!     #[test]
//!     fn codec_roundtrip(t in ticket()) {
//!         let bytes = encode_ticket(&t).unwrap();
//!         prop_assert_eq!(decode_ticket(&bytes).unwrap(), t);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use ibc_tickets_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let (origin, packet) = fixture.in_transit("cosmoshub-4", "ABC", 1).await;
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{owners, TestFixture};
pub use generators::{coin, origin_key, owner_id, ticket, ticket_status, tx_hash_entry};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
