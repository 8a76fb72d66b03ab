//! End-to-end ticket lifecycles against the in-memory and SQLite backends.

use std::sync::{Arc, Once};
use std::time::Duration;

use ibc_tickets::backend::{KeyTtl, KeyValueBackend, MemoryBackend, SqliteBackend};
use ibc_tickets::{
    OwnerId, StoreConfig, TicketLink, TicketStatus, TicketStore, TicketStoreError, TransitHop,
    TxHashEntry,
};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ibc_tickets=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn memory_store() -> TicketStore<MemoryBackend> {
    init_tracing();
    TicketStore::new(MemoryBackend::new(), StoreConfig::default())
}

fn hop(sequence: u64) -> TransitHop {
    TransitHop {
        dest_chain: "osmosis-1".into(),
        source_channel: "channel-141".into(),
        sequence,
        tx_hash: "SEND".into(),
        chain_name: "cosmoshub-4".into(),
        height: 100,
    }
}

const EXTENDED: KeyTtl = KeyTtl::Expires(Duration::from_secs(600));

#[tokio::test(start_paused = true)]
async fn create_indexes_ticket_and_opens_shadow() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();

    let ticket = store.get(&key).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Pending);
    assert_eq!(ticket.owner, Some(OwnerId::from_identity("cosmos1owner")));
    assert_eq!(ticket.link, TicketLink::Origin);
    assert!(ticket.tx_hashes.is_empty());

    assert_eq!(store.expiry(&key).await.unwrap(), KeyTtl::Persistent);
    assert!(store.shadow_pending(&key).await.unwrap());

    let tickets = store.user_tickets(b"cosmos1owner").await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets["cosmoshub-4"], vec!["ABC"]);

    // The owner set is named by the hex of the raw owner bytes.
    let members = store
        .backend()
        .set_members("636f736d6f73316f776e6572")
        .await
        .unwrap();
    assert_eq!(members, vec!["cosmoshub-4/ABC"]);
}

#[tokio::test(start_paused = true)]
async fn complete_clears_index_and_shadow() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();

    store.complete(&key, 1234).await.unwrap();

    let ticket = store.get(&key).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Complete);
    assert_eq!(ticket.height, 1234);
    assert!(ticket.owner.is_none());
    assert_eq!(store.expiry(&key).await.unwrap(), EXTENDED);
    assert!(!store.shadow_pending(&key).await.unwrap());
    assert!(store.user_tickets(b"cosmos1owner").await.unwrap().is_empty());

    tokio::time::advance(Duration::from_secs(601)).await;
    assert!(!store.exists(&key).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn complete_twice_keeps_index_consistent() {
    let store = memory_store();
    let first = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();
    let second = store.create("cosmoshub-4", "DEF", b"cosmos1owner").await.unwrap();

    store.complete(&first, 10).await.unwrap();
    store.complete(&first, 11).await.unwrap();

    assert_eq!(store.get(&first).await.unwrap().height, 11);
    assert_eq!(
        store.user_tickets(b"cosmos1owner").await.unwrap()["cosmoshub-4"],
        vec!["DEF"]
    );
    assert!(store.shadow_pending(&second).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn transit_then_received_extends_trail() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();

    let packet = store.mark_in_transit(&key, &hop(42)).await.unwrap();
    assert_eq!(packet.to_string(), "osmosis-1-channel-141-42");

    let origin = store.get(&key).await.unwrap();
    assert_eq!(origin.status, TicketStatus::Transit);
    assert_eq!(origin.height, 100);
    assert_eq!(origin.owner, Some(OwnerId::from_identity("cosmos1owner")));
    assert_eq!(store.expiry(&key).await.unwrap(), EXTENDED);
    assert!(store.shadow_pending(&key).await.unwrap());

    let derived = store.get(&packet).await.unwrap();
    assert_eq!(derived.origin(), Some(&key));
    assert_eq!(derived.owner, origin.owner);
    assert_eq!(derived.status, TicketStatus::Transit);
    assert_eq!(
        derived.tx_hashes,
        vec![TxHashEntry::new("cosmoshub-4", TicketStatus::Transit, "SEND")]
    );
    assert_eq!(store.expiry(&packet).await.unwrap(), EXTENDED);

    store.ibc_received(&packet, "RECV", "osmosis-1", 200).await.unwrap();

    let done = store.get(&key).await.unwrap();
    assert_eq!(done.status, TicketStatus::IbcReceiveSuccess);
    assert_eq!(done.height, 200);
    assert_eq!(
        done.tx_hashes,
        vec![
            TxHashEntry::new("cosmoshub-4", TicketStatus::Transit, "SEND"),
            TxHashEntry::new("osmosis-1", TicketStatus::IbcReceiveSuccess, "RECV"),
        ]
    );
    assert_eq!(store.expiry(&key).await.unwrap(), EXTENDED);
    assert!(!store.shadow_pending(&key).await.unwrap());
    assert!(store.user_tickets(b"cosmos1owner").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transit_then_failed_keeps_ticket_outstanding() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();
    let packet = store.mark_in_transit(&key, &hop(1)).await.unwrap();

    store.ibc_failed(&packet, "FAIL", "osmosis-1", 150).await.unwrap();

    let ticket = store.get(&key).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::IbcReceiveFailed);
    assert_eq!(ticket.tx_hashes.len(), 2);
    assert_eq!(ticket.tx_hashes[1].status, TicketStatus::IbcReceiveFailed);
    assert_eq!(store.expiry(&key).await.unwrap(), KeyTtl::Persistent);
    assert!(store.shadow_pending(&key).await.unwrap());
    assert_eq!(
        store.user_tickets(b"cosmos1owner").await.unwrap()["cosmoshub-4"],
        vec!["ABC"]
    );
}

#[tokio::test(start_paused = true)]
async fn transit_then_timeout_unlock() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();
    let packet = store.mark_in_transit(&key, &hop(9)).await.unwrap();

    store.ibc_timeout_unlock(&packet, "REFUND", "cosmoshub-4", 300).await.unwrap();

    let ticket = store.get(&key).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::TokensUnlockedTimeout);
    assert_eq!(
        ticket.tx_hashes.last(),
        Some(&TxHashEntry::new("cosmoshub-4", TicketStatus::TokensUnlockedTimeout, "REFUND"))
    );
    assert!(!store.shadow_pending(&key).await.unwrap());
    assert!(store.user_tickets(b"cosmos1owner").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shadow_expires_while_ticket_persists() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();

    tokio::time::advance(Duration::from_secs(299)).await;
    assert!(store.shadow_pending(&key).await.unwrap());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(!store.shadow_pending(&key).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap().status, TicketStatus::Pending);
    assert_eq!(store.expiry(&key).await.unwrap(), KeyTtl::Persistent);
}

#[tokio::test(start_paused = true)]
async fn derived_ticket_expires_before_chase() {
    let store = memory_store();
    let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();
    let packet = store.mark_in_transit(&key, &hop(3)).await.unwrap();

    tokio::time::advance(Duration::from_secs(601)).await;

    let err = store.ibc_received(&packet, "RECV", "osmosis-1", 200).await.unwrap_err();
    assert!(matches!(err, TicketStoreError::NotFound { ref key } if *key == packet.to_string()));
    // The origin expired with it; the index entry is what is left to reconcile.
    assert!(!store.exists(&key).await.unwrap());
    assert_eq!(store.user_tickets(b"cosmos1owner").await.unwrap().len(), 1);
}

#[tokio::test]
async fn swap_fees_sum_per_pool() {
    let store = memory_store();
    store.record_swap_fee_at("1", "100", "uatom", 1_700_000_000).await.unwrap();
    store.record_swap_fee_at("1", "50", "uatom", 1_700_000_060).await.unwrap();
    store.record_swap_fee_at("2", "75", "uatom", 1_700_000_000).await.unwrap();

    let fees = store.swap_fees("1").await.unwrap();
    assert_eq!(fees.to_string(), "150uatom");
    assert_eq!(store.swap_fees("2").await.unwrap().to_string(), "75uatom");
    assert!(store.swap_fees("3").await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_do_not_interfere() {
    let store = Arc::new(memory_store());

    let mut handles = Vec::new();
    for i in 0..64u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let owner = if i % 2 == 0 { "cosmos1even" } else { "cosmos1odd" };
            store
                .create("cosmoshub-4", &format!("TX{:03}", i), owner)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let even = store.user_tickets("cosmos1even").await.unwrap();
    let odd = store.user_tickets("cosmos1odd").await.unwrap();
    assert_eq!(even["cosmoshub-4"].len(), 32);
    assert_eq!(odd["cosmoshub-4"].len(), 32);
    assert!(even["cosmoshub-4"].iter().all(|tx| tx[2..].parse::<u32>().unwrap() % 2 == 0));

    for tx in &even["cosmoshub-4"] {
        let key = ibc_tickets::OriginKey::new("cosmoshub-4", tx.as_str()).unwrap();
        let ticket = store.get(&key).await.unwrap();
        assert_eq!(ticket.owner, Some(OwnerId::from_identity("cosmos1even")));
    }
}

#[tokio::test]
async fn sqlite_backend_survives_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tickets.db");

    let (key, packet) = {
        let store = TicketStore::new(SqliteBackend::open(&path).unwrap(), StoreConfig::default());
        let key = store.create("cosmoshub-4", "ABC", b"cosmos1owner").await.unwrap();
        let packet = store.mark_in_transit(&key, &hop(5)).await.unwrap();
        store.create("cosmoshub-4", "DEF", b"cosmos1owner").await.unwrap();
        (key, packet)
    };

    let store = TicketStore::new(SqliteBackend::open(&path).unwrap(), StoreConfig::default());
    assert_eq!(store.get(&key).await.unwrap().status, TicketStatus::Transit);
    assert_eq!(
        store.user_tickets(b"cosmos1owner").await.unwrap()["cosmoshub-4"],
        vec!["ABC", "DEF"]
    );

    store.ibc_received(&packet, "RECV", "osmosis-1", 200).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap().tx_hashes.len(), 2);
    assert_eq!(
        store.user_tickets(b"cosmos1owner").await.unwrap()["cosmoshub-4"],
        vec!["DEF"]
    );
}
