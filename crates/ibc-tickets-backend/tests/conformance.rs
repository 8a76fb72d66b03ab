//! Behaviour every KeyValueBackend must share, run against each implementation.
//!
//! The Redis run needs a live server and is ignored by default:
//!
//! ```text
//! IBC_TICKETS_REDIS_URL=redis://127.0.0.1:6379/15 cargo test -p ibc-tickets-backend -- --ignored
//! ```

use std::time::Duration;

use bytes::Bytes;
use ibc_tickets_backend::{KeyTtl, KeyValueBackend, MemoryBackend, RedisBackend, SqliteBackend};

async fn scan_all<B: KeyValueBackend>(backend: &B, pattern: &str, count: usize) -> Vec<String> {
    let mut keys = Vec::new();
    let mut cursor = 0;
    loop {
        let page = backend.scan(cursor, pattern, count).await.unwrap();
        keys.extend(page.keys);
        if page.cursor == 0 {
            return keys;
        }
        cursor = page.cursor;
    }
}

async fn key_roundtrip<B: KeyValueBackend>(backend: &B, ns: &str) {
    let key = format!("{}cosmoshub/ABC123", ns);

    assert!(backend.get(&key).await.unwrap().is_none());
    assert!(!backend.exists(&key).await.unwrap());
    assert_eq!(backend.ttl(&key).await.unwrap(), KeyTtl::Missing);

    backend
        .set(&key, Bytes::from_static(br#"{"status":"pending"}"#), None)
        .await
        .unwrap();
    assert!(backend.exists(&key).await.unwrap());
    assert_eq!(backend.ttl(&key).await.unwrap(), KeyTtl::Persistent);

    backend
        .set(&key, Bytes::from_static(br#"{"status":"complete"}"#), Some(Duration::from_secs(600)))
        .await
        .unwrap();
    let value = backend.get(&key).await.unwrap().unwrap();
    assert_eq!(&value[..], br#"{"status":"complete"}"#);
    match backend.ttl(&key).await.unwrap() {
        KeyTtl::Expires(left) => assert!(left <= Duration::from_secs(600) && left > Duration::from_secs(500)),
        other => panic!("expected an expiring key, got {:?}", other),
    }

    assert!(backend.delete(&key).await.unwrap());
    assert!(!backend.delete(&key).await.unwrap());
}

async fn set_semantics<B: KeyValueBackend>(backend: &B, ns: &str) {
    let set = format!("{}6164647231", ns);

    assert!(backend.set_members(&set).await.unwrap().is_empty());
    assert!(backend.set_add(&set, "cosmoshub/A").await.unwrap());
    assert!(!backend.set_add(&set, "cosmoshub/A").await.unwrap());
    assert!(backend.set_add(&set, "osmosis/B").await.unwrap());

    let mut members = backend.set_members(&set).await.unwrap();
    members.sort();
    assert_eq!(members, vec!["cosmoshub/A", "osmosis/B"]);

    assert!(backend.set_remove(&set, "cosmoshub/A").await.unwrap());
    assert!(!backend.set_remove(&set, "cosmoshub/A").await.unwrap());
    assert!(backend.set_remove(&set, "osmosis/B").await.unwrap());
    assert!(backend.set_members(&set).await.unwrap().is_empty());
}

async fn scan_semantics<B: KeyValueBackend>(backend: &B, ns: &str) {
    for ts in 0..30 {
        backend
            .set(&format!("{}pool/1/{}", ns, ts), Bytes::from_static(b"10uatom"), None)
            .await
            .unwrap();
    }
    backend
        .set(&format!("{}pool/12/1", ns), Bytes::from_static(b"10uatom"), None)
        .await
        .unwrap();

    let mut keys = scan_all(backend, &format!("{}pool/1/*", ns), 7).await;
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 30);

    for key in keys {
        backend.delete(&key).await.unwrap();
    }
    backend.delete(&format!("{}pool/12/1", ns)).await.unwrap();
}

async fn conformance<B: KeyValueBackend>(backend: &B, ns: &str) {
    key_roundtrip(backend, ns).await;
    set_semantics(backend, ns).await;
    scan_semantics(backend, ns).await;
}

#[tokio::test]
async fn memory_backend_conforms() {
    let backend = MemoryBackend::new();
    conformance(&backend, "").await;
}

#[tokio::test]
async fn sqlite_backend_conforms() {
    let backend = SqliteBackend::open_memory().unwrap();
    conformance(&backend, "").await;
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a redis server; set IBC_TICKETS_REDIS_URL"]
async fn redis_backend_conforms() {
    let url = std::env::var("IBC_TICKETS_REDIS_URL").expect("IBC_TICKETS_REDIS_URL must be set");
    let backend = RedisBackend::connect(&url).await.unwrap();
    conformance(&backend, "ibc-tickets-conformance:").await;
}
