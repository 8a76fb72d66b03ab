//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ibc_tickets_core::{Coin, OriginKey, OwnerId, Ticket, TicketLink, TicketStatus, TxHashEntry};

/// Generate a chain id such as `cosmoshub-4`.
pub fn chain_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{2,11}(-[0-9]{1,3})?".prop_map(String::from)
}

/// Generate an upper-case hex transaction hash.
pub fn tx_hash() -> impl Strategy<Value = String> {
    "[0-9A-F]{64}".prop_map(String::from)
}

/// Generate an owner from arbitrary identity bytes.
pub fn owner_id() -> impl Strategy<Value = OwnerId> {
    prop::collection::vec(any::<u8>(), 1..=64).prop_map(OwnerId::from_identity)
}

/// Generate a TicketStatus.
pub fn ticket_status() -> impl Strategy<Value = TicketStatus> {
    prop::sample::select(TicketStatus::ALL.to_vec())
}

/// Generate an origin key.
pub fn origin_key() -> impl Strategy<Value = OriginKey> {
    (chain_id(), tx_hash()).prop_map(|(chain, tx)| {
        OriginKey::new(chain, tx).expect("generated components contain no delimiter")
    })
}

/// Generate one audit-trail entry.
pub fn tx_hash_entry() -> impl Strategy<Value = TxHashEntry> {
    (chain_id(), ticket_status(), tx_hash())
        .prop_map(|(chain, status, tx)| TxHashEntry::new(chain, status, tx))
}

/// Generate an origin or derived link.
pub fn ticket_link() -> impl Strategy<Value = TicketLink> {
    prop_oneof![
        Just(TicketLink::Origin),
        origin_key().prop_map(|origin| TicketLink::Derived { origin }),
    ]
}

/// Generate any ticket the store can persist.
///
/// Optional strings are never `Some("")`, since the wire format cannot tell
/// an empty string from an absent one.
pub fn ticket() -> impl Strategy<Value = Ticket> {
    (
        prop::option::of(owner_id()),
        ticket_link(),
        any::<i64>(),
        ticket_status(),
        prop::collection::vec(tx_hash_entry(), 0..4),
        prop::option::of("[ -~]{1,48}"),
    )
        .prop_map(|(owner, link, height, status, tx_hashes, error)| Ticket {
            owner,
            link,
            height,
            status,
            tx_hashes,
            error,
        })
}

/// Generate a coin with a valid denomination.
pub fn coin() -> impl Strategy<Value = Coin> {
    ("[a-z][a-z0-9]{2,15}", any::<u64>()).prop_map(|(denom, amount)| Coin {
        denom,
        amount: u128::from(amount),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_tickets_core::{decode_ticket, encode_ticket, Coins};

    proptest! {
        #[test]
        fn test_codec_roundtrip(t in ticket()) {
            let bytes = encode_ticket(&t).unwrap();
            prop_assert_eq!(decode_ticket(&bytes).unwrap(), t);
        }

        #[test]
        fn test_origin_key_parses_its_display(key in origin_key()) {
            prop_assert_eq!(OriginKey::parse(&key.to_string()).unwrap(), key);
        }

        #[test]
        fn test_coin_sum_is_order_independent(coins in prop::collection::vec(coin(), 0..8)) {
            let mut forward = Coins::new();
            for c in coins.iter().cloned() {
                forward.add(c).unwrap();
            }
            let mut backward = Coins::new();
            for c in coins.iter().rev().cloned() {
                backward.add(c).unwrap();
            }

            prop_assert_eq!(&forward, &backward);
            prop_assert_eq!(Coins::parse(&forward.to_string()).unwrap(), forward);
        }
    }
}
