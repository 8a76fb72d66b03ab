//! Golden wire vectors.
//!
//! Each vector pairs a ticket with the exact JSON stored for it. Anything
//! else reading the backend relies on these bytes, so a change here is a
//! format change.

use ibc_tickets_core::{
    decode_ticket, encode_ticket, OriginKey, OwnerId, Ticket, TicketStatus, TxHashEntry,
};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The ticket as the store builds it.
    pub ticket: Ticket,
    /// Expected stored value.
    pub json: &'static str,
}

fn origin() -> OriginKey {
    OriginKey::new("cosmoshub-4", "ABC").expect("static key is valid")
}

fn send_hop() -> TxHashEntry {
    TxHashEntry::new("cosmoshub-4", TicketStatus::Transit, "SEND")
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    let owner = OwnerId::from_identity("addr1");

    vec![
        GoldenVector {
            name: "freshly created ticket",
            ticket: Ticket::pending(owner.clone()),
            json: r#"{"owner":"6164647231","status":"pending"}"#,
        },
        GoldenVector {
            name: "origin in transit",
            ticket: Ticket {
                status: TicketStatus::Transit,
                height: 100,
                ..Ticket::pending(owner.clone())
            },
            json: r#"{"owner":"6164647231","height":100,"status":"transit"}"#,
        },
        GoldenVector {
            name: "derived ticket",
            ticket: Ticket::derived(origin(), Some(owner), send_hop(), 100),
            json: concat!(
                r#"{"owner":"6164647231","info":"cosmoshub-4/ABC","height":100,"status":"transit","#,
                r#""tx_hashes":[{"Chain":"cosmoshub-4","Status":"transit","TxHash":"SEND"}]}"#
            ),
        },
        GoldenVector {
            name: "complete",
            ticket: Ticket::rewrite(TicketStatus::Complete, Vec::new(), 1234),
            json: r#"{"height":1234,"status":"complete"}"#,
        },
        GoldenVector {
            name: "failed with diagnostic",
            ticket: Ticket::failed("out of gas", 99),
            json: r#"{"height":99,"status":"failed","error":"out of gas"}"#,
        },
        GoldenVector {
            name: "received on destination",
            ticket: Ticket::rewrite(
                TicketStatus::IbcReceiveSuccess,
                vec![
                    send_hop(),
                    TxHashEntry::new("osmosis-1", TicketStatus::IbcReceiveSuccess, "RECV"),
                ],
                200,
            ),
            json: concat!(
                r#"{"height":200,"status":"IBC_receive_success","tx_hashes":["#,
                r#"{"Chain":"cosmoshub-4","Status":"transit","TxHash":"SEND"},"#,
                r#"{"Chain":"osmosis-1","Status":"IBC_receive_success","TxHash":"RECV"}]}"#
            ),
        },
        GoldenVector {
            name: "refunded after error ack",
            ticket: Ticket::rewrite(
                TicketStatus::TokensUnlockedAck,
                vec![
                    send_hop(),
                    TxHashEntry::new("cosmoshub-4", TicketStatus::TokensUnlockedAck, "ACK"),
                ],
                210,
            ),
            json: concat!(
                r#"{"height":210,"status":"Tokens_unlocked_ack","tx_hashes":["#,
                r#"{"Chain":"cosmoshub-4","Status":"transit","TxHash":"SEND"},"#,
                r#"{"Chain":"cosmoshub-4","Status":"Tokens_unlocked_ack","TxHash":"ACK"}]}"#
            ),
        },
    ]
}

/// Encode and decode every vector against its expected JSON.
///
/// Returns `(name, matches, produced_json)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let produced = encode_ticket(&v.ticket)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_else(|e| format!("<encode error: {}>", e));
            let decoded = decode_ticket(v.json.as_bytes()).ok();

            let matches = produced == v.json && decoded.as_ref() == Some(&v.ticket);
            (v.name.to_string(), matches, produced)
        })
        .collect()
}
